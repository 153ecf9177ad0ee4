// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surfaces and surface resolution.
//!
//! A [`Surface`] is the drawing target a figure renders into: a sized
//! [`Scene`] plus pointer/hover dispatch. Surfaces are shared through
//! [`SurfaceHandle`], a single-threaded shared handle — state is
//! single-writer and concurrent mutation of one surface is not supported.
//!
//! Resolution of "where do I draw" goes through the [`SurfaceProvider`]
//! trait instead of ambient document lookups: callers hand a
//! [`SurfaceSpec`] naming an existing surface, a mount point to create one
//! at, or an explicit handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use kurbo::Point;
use thiserror::Error;

use crate::scene::{NodeId, Scene};

/// Errors raised while resolving or creating surfaces.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Width or height was unset or not positive.
    #[error("surface size must be specified")]
    SizeUnset,
    /// The named mount point is not registered.
    #[error("mount point `{0}` does not exist")]
    MountMissing(String),
    /// No surface is registered under the given id.
    #[error("no surface exists with id `{0}`")]
    UnknownSurface(String),
    /// The spec carried neither a resolvable id, mount point, nor handle.
    #[error("surface spec must name an existing surface, a mount point, or carry a handle")]
    Unresolvable,
}

/// Shared single-threaded handle to a [`Surface`].
pub type SurfaceHandle = Rc<RefCell<Surface>>;

/// An action run when the pointer enters or leaves a bound node.
pub type HoverAction = Rc<dyn Fn(&mut Scene, NodeId)>;

/// Hover wiring for one (usually invisible, enlarged) hit-test node.
#[derive(Clone)]
pub struct HoverBinding {
    /// The node receiving pointer events.
    pub node: NodeId,
    /// Runs when the pointer enters the node.
    pub enter: HoverAction,
    /// Runs when the pointer leaves the node.
    pub leave: HoverAction,
}

impl fmt::Debug for HoverBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverBinding")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// A sized drawing surface.
pub struct Surface {
    /// Surface id (also the element-id prefix of every node drawn into it).
    pub id: String,
    /// Surface width in scene units.
    pub width: f64,
    /// Surface height in scene units.
    pub height: f64,
    /// The retained node scene.
    pub scene: Scene,
    bindings: Vec<HoverBinding>,
    hovered: Option<NodeId>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("nodes", &self.scene.len())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

impl Surface {
    /// Creates an empty surface.
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            scene: Scene::new(),
            bindings: Vec::new(),
            hovered: None,
        }
    }

    /// Wraps a new surface in a shared handle.
    pub fn new_handle(id: impl Into<String>, width: f64, height: f64) -> SurfaceHandle {
        Rc::new(RefCell::new(Self::new(id, width, height)))
    }

    /// Attaches hover wiring to a node. A later binding for the same node
    /// shadows an earlier one.
    pub fn bind_hover(&mut self, binding: HoverBinding) {
        self.bindings.push(binding);
    }

    /// Drops all hover wiring for `node`.
    pub fn unbind_hover(&mut self, node: NodeId) {
        self.bindings.retain(|b| b.node != node);
        if self.hovered == Some(node) {
            self.hovered = None;
        }
    }

    fn binding_for(&self, node: NodeId) -> Option<&HoverBinding> {
        self.bindings.iter().rev().find(|b| b.node == node)
    }

    /// Topmost pointer-enabled bound node containing `p`, if any.
    pub fn hit_test(&self, p: Point) -> Option<NodeId> {
        let mut hit = None;
        for (id, node) in self.scene.nodes() {
            if node.pointer_events && self.binding_for(id).is_some() && node.shape.contains(p) {
                hit = Some(id);
            }
        }
        hit
    }

    /// Dispatches a pointer position, firing leave/enter hover actions.
    pub fn pointer_moved(&mut self, p: Point) {
        let hit = self.hit_test(p);
        if hit == self.hovered {
            return;
        }
        let leave = self
            .hovered
            .and_then(|n| self.binding_for(n).map(|b| (n, Rc::clone(&b.leave))));
        let enter = hit.and_then(|n| self.binding_for(n).map(|b| (n, Rc::clone(&b.enter))));
        self.hovered = hit;
        if let Some((node, action)) = leave {
            action(&mut self.scene, node);
        }
        if let Some((node, action)) = enter {
            action(&mut self.scene, node);
        }
    }

    /// Dispatches the pointer leaving the surface entirely.
    pub fn pointer_left(&mut self) {
        if let Some((node, action)) = self
            .hovered
            .and_then(|n| self.binding_for(n).map(|b| (n, Rc::clone(&b.leave))))
        {
            self.hovered = None;
            action(&mut self.scene, node);
        }
    }
}

/// Where a layer should draw.
#[derive(Clone, Debug)]
pub enum SurfaceSpec {
    /// An already-created surface, by surface id.
    Existing(String),
    /// A mount point to create a surface at.
    Mount {
        /// Mount-point id.
        target: String,
        /// Width of the created surface.
        width: f64,
        /// Height of the created surface.
        height: f64,
    },
    /// An explicit handle.
    Handle(SurfaceHandle),
}

/// Resolves a [`SurfaceSpec`] into a handle, creating surfaces on demand.
pub trait SurfaceProvider {
    /// Resolves the spec, creating a surface when it names a mount point.
    fn resolve_or_create(&mut self, spec: &SurfaceSpec) -> Result<SurfaceHandle, SurfaceError>;
}

/// Derives the surface id for a mount point.
pub fn surface_node_id(mount: &str) -> String {
    format!("stratum_{mount}")
}

/// The default [`SurfaceProvider`]: an explicit registry of mount points and
/// the surfaces created at them.
///
/// Hosts register the mount points that exist in their document up front;
/// resolution never consults ambient global state.
#[derive(Debug, Default)]
pub struct MountRegistry {
    mounts: Vec<String>,
    surfaces: HashMap<String, SurfaceHandle>,
}

impl MountRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mount point id.
    pub fn register_mount(&mut self, id: impl Into<String>) {
        self.mounts.push(id.into());
    }

    /// Returns the surface registered under `id`.
    pub fn surface(&self, id: &str) -> Option<SurfaceHandle> {
        self.surfaces.get(id).cloned()
    }

    /// Creates a surface at `target`, or returns the one already created
    /// there.
    pub fn create_surface(
        &mut self,
        target: &str,
        width: f64,
        height: f64,
    ) -> Result<SurfaceHandle, SurfaceError> {
        if !(width > 0.0) || !(height > 0.0) {
            return Err(SurfaceError::SizeUnset);
        }
        if !self.mounts.iter().any(|m| m == target) {
            return Err(SurfaceError::MountMissing(target.to_owned()));
        }
        let id = surface_node_id(target);
        if let Some(existing) = self.surfaces.get(&id) {
            return Ok(Rc::clone(existing));
        }
        tracing::debug!(target: "stratum", surface = %id, width, height, "creating surface");
        let handle = Surface::new_handle(id.clone(), width, height);
        self.surfaces.insert(id, Rc::clone(&handle));
        Ok(handle)
    }
}

impl SurfaceProvider for MountRegistry {
    fn resolve_or_create(&mut self, spec: &SurfaceSpec) -> Result<SurfaceHandle, SurfaceError> {
        match spec {
            SurfaceSpec::Handle(handle) => Ok(Rc::clone(handle)),
            SurfaceSpec::Existing(id) => self
                .surface(id)
                .ok_or_else(|| SurfaceError::UnknownSurface(id.clone())),
            SurfaceSpec::Mount {
                target,
                width,
                height,
            } => self.create_surface(target, *width, *height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Node, Shape};
    use kurbo::Circle;
    use peniko::Brush;
    use peniko::color::palette::css;

    #[test]
    fn create_surface_requires_size_and_mount() {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        assert!(matches!(
            reg.create_surface("chart", 0.0, 100.0),
            Err(SurfaceError::SizeUnset)
        ));
        assert!(matches!(
            reg.create_surface("missing", 100.0, 100.0),
            Err(SurfaceError::MountMissing(_))
        ));
        let handle = reg.create_surface("chart", 300.0, 150.0).unwrap();
        assert_eq!(handle.borrow().id, "stratum_chart");
    }

    #[test]
    fn mount_resolution_is_idempotent() {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let spec = SurfaceSpec::Mount {
            target: "chart".into(),
            width: 300.0,
            height: 150.0,
        };
        let a = reg.resolve_or_create(&spec).unwrap();
        let b = reg.resolve_or_create(&spec).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn existing_id_must_be_registered() {
        let mut reg = MountRegistry::new();
        let err = reg
            .resolve_or_create(&SurfaceSpec::Existing("nope".into()))
            .unwrap_err();
        assert!(matches!(err, SurfaceError::UnknownSurface(_)));
    }

    #[test]
    fn hover_dispatch_fires_enter_and_leave() {
        use std::cell::Cell;

        let mut surface = Surface::new("s", 100.0, 100.0);
        let node = surface.scene.insert(
            Node::new("s_a_collision_0", Shape::Circle(Circle::new((50.0, 50.0), 20.0)))
                .with_pointer_events(),
        );
        let entered = Rc::new(Cell::new(0));
        let left = Rc::new(Cell::new(0));
        let e = Rc::clone(&entered);
        let l = Rc::clone(&left);
        surface.bind_hover(HoverBinding {
            node,
            enter: Rc::new(move |scene, id| {
                e.set(e.get() + 1);
                if let Some(n) = scene.node_mut(id) {
                    n.fill = Brush::Solid(css::ORANGE);
                }
            }),
            leave: Rc::new(move |_, _| l.set(l.get() + 1)),
        });

        surface.pointer_moved(Point::new(50.0, 50.0));
        assert_eq!(entered.get(), 1);
        assert_eq!(left.get(), 0);
        // Moving within the node does not re-fire.
        surface.pointer_moved(Point::new(55.0, 50.0));
        assert_eq!(entered.get(), 1);
        surface.pointer_moved(Point::new(5.0, 5.0));
        assert_eq!(left.get(), 1);
    }
}
