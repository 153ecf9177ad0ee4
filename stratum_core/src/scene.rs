// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained node scene.
//!
//! A [`Scene`] owns every visual element a chart has produced. Nodes are
//! addressed two ways: by [`NodeId`] (a stable slot index handed back on
//! insertion, used by layers holding element handles) and by element-id
//! string (the `{surface}_{layer}_{role}_{index}` naming scheme, used by
//! fade hooks that cross-reference sibling elements).

use hashbrown::HashMap;
use kurbo::{BezPath, Circle, Point, Rect, Shape as _};
use peniko::{Brush, Color};

use crate::transition::{AttrTarget, Transition};

/// Stable handle to a node in a [`Scene`].
///
/// Ids are never reused within a scene; removing a node leaves a tombstone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Horizontal text anchoring, matching the SVG `text-anchor` values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Anchor at the start of the text run.
    #[default]
    Start,
    /// Anchor at the middle of the text run.
    Middle,
    /// Anchor at the end of the text run.
    End,
}

/// A positioned text run.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShape {
    /// Anchor position.
    pub pos: Point,
    /// The rendered string.
    pub content: String,
    /// Font size in scene units.
    pub font_size: f64,
    /// Horizontal anchoring.
    pub anchor: TextAnchor,
    /// Rotation in degrees about `pos` (0 = unrotated).
    pub angle: f64,
}

impl TextShape {
    /// Creates an unrotated, start-anchored text shape.
    pub fn new(pos: Point, content: impl Into<String>, font_size: f64) -> Self {
        Self {
            pos,
            content: content.into(),
            font_size,
            anchor: TextAnchor::Start,
            angle: 0.0,
        }
    }
}

/// Geometry payload of a [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A circle.
    Circle(Circle),
    /// An arbitrary Bézier path.
    Path(BezPath),
    /// A text run. Text does not participate in hit testing.
    Text(TextShape),
}

impl Shape {
    /// Whether `p` lies inside this shape (false for text).
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Rect(r) => r.contains(p),
            Self::Circle(c) => c.contains(p),
            Self::Path(path) => path.contains(p),
            Self::Text(_) => false,
        }
    }

    /// Bounding box of the shape (a rough estimate for text).
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::Circle(c) => c.bounding_box(),
            Self::Path(path) => path.bounding_box(),
            Self::Text(t) => {
                let w = 0.6 * t.font_size * t.content.chars().count() as f64;
                Rect::new(t.pos.x, t.pos.y - t.font_size, t.pos.x + w, t.pos.y)
            }
        }
    }
}

/// A single visual element.
#[derive(Clone, Debug)]
pub struct Node {
    /// Element-id string, unique per scene by convention.
    pub elem_id: String,
    /// Class tag (free-form, mirrors SVG `class`).
    pub class: String,
    /// Geometry payload.
    pub shape: Shape,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width in scene units.
    pub stroke_width: f64,
    /// Whether the node receives pointer events.
    pub pointer_events: bool,
}

impl Node {
    /// Creates a node with transparent paints and no pointer events.
    pub fn new(elem_id: impl Into<String>, shape: Shape) -> Self {
        Self {
            elem_id: elem_id.into(),
            class: String::new(),
            shape,
            fill: Brush::Solid(Color::TRANSPARENT),
            stroke: Brush::Solid(Color::TRANSPARENT),
            stroke_width: 0.0,
            pointer_events: false,
        }
    }

    /// Sets the class tag.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Sets the fill paint.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the stroke paint.
    pub fn with_stroke(mut self, stroke: impl Into<Brush>, width: f64) -> Self {
        self.stroke = stroke.into();
        self.stroke_width = width;
        self
    }

    /// Enables pointer events for this node.
    pub fn with_pointer_events(mut self) -> Self {
        self.pointer_events = true;
        self
    }
}

/// A retained, ordered collection of nodes plus the transitions animating
/// them.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Option<Node>>,
    index: HashMap<String, NodeId>,
    transitions: Vec<Transition>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    ///
    /// Paint order follows insertion order. If another live node carries the
    /// same element-id, the index is repointed at the new node (matching
    /// last-write-wins element lookup).
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.index.insert(node.elem_id.clone(), id);
        self.slots.push(Some(node));
        id
    }

    /// Returns the node for `id`, if it is still live.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(|s| s.as_ref())
    }

    /// Returns the node for `id` mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(|s| s.as_mut())
    }

    /// Looks a node up by its element-id string.
    pub fn node_by_elem_id(&self, elem_id: &str) -> Option<NodeId> {
        let id = *self.index.get(elem_id)?;
        self.node(id).map(|_| id)
    }

    /// Removes a node, dropping any transitions targeting it.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(id.0)?.take()?;
        if self.index.get(node.elem_id.as_str()) == Some(&id) {
            self.index.remove(node.elem_id.as_str());
        }
        self.transitions.retain(|t| t.node != id);
        Some(node)
    }

    /// Iterates live nodes in paint order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|n| (NodeId(i), n)))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the scene has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live nodes whose element-id starts with `prefix`, in paint order.
    pub fn nodes_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (NodeId, &'a Node)> {
        self.nodes().filter(move |(_, n)| n.elem_id.starts_with(prefix))
    }

    /// Schedules a transition, replacing any in-flight transition animating
    /// the same attributes of the same node (last-write-wins).
    pub fn schedule(&mut self, transition: Transition) {
        if self.node(transition.node).is_none() {
            return;
        }
        for t in &mut self.transitions {
            if t.node == transition.node {
                t.drop_attrs_of(&transition);
            }
        }
        self.transitions.retain(|t| !t.is_exhausted());
        self.transitions.push(transition);
    }

    /// Sets attributes immediately, cancelling any transition on them.
    pub fn apply(&mut self, node: NodeId, targets: Vec<AttrTarget>) {
        let probe = Transition::new(node, 0.0, 0.0, targets);
        for t in &mut self.transitions {
            if t.node == node {
                t.drop_attrs_of(&probe);
            }
        }
        self.transitions.retain(|t| !t.is_exhausted());
        if let Some(n) = self.node_mut(node) {
            probe.apply_final(n);
        }
    }

    /// Advances all transitions by `dt_ms` milliseconds.
    pub fn tick(&mut self, dt_ms: f64) {
        let mut finished = Vec::new();
        for (i, t) in self.transitions.iter_mut().enumerate() {
            match self.slots.get_mut(t.node.0).and_then(|s| s.as_mut()) {
                Some(node) => {
                    if t.advance(node, dt_ms) {
                        finished.push(i);
                    }
                }
                None => finished.push(i),
            }
        }
        for i in finished.into_iter().rev() {
            self.transitions.swap_remove(i);
        }
    }

    /// Fast-forwards every transition to its final state.
    ///
    /// Headless renders and tests use this instead of real-time ticking.
    pub fn settle(&mut self) {
        let transitions = core::mem::take(&mut self.transitions);
        for t in transitions {
            if let Some(node) = self.slots.get_mut(t.node.0).and_then(|s| s.as_mut()) {
                t.apply_final(node);
            }
        }
    }

    /// Whether any transition is still in flight.
    pub fn has_active_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_node(id: &str) -> Node {
        Node::new(id, Shape::Rect(Rect::new(0.0, 0.0, 10.0, 10.0)))
    }

    #[test]
    fn insert_then_lookup_by_elem_id() {
        let mut scene = Scene::new();
        let id = scene.insert(rect_node("svg_a_rect_0"));
        assert_eq!(scene.node_by_elem_id("svg_a_rect_0"), Some(id));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn remove_leaves_no_stale_index() {
        let mut scene = Scene::new();
        let id = scene.insert(rect_node("n"));
        scene.remove(id);
        assert!(scene.node_by_elem_id("n").is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn paint_order_is_insertion_order() {
        let mut scene = Scene::new();
        scene.insert(rect_node("a"));
        scene.insert(rect_node("b"));
        let order: Vec<_> = scene.nodes().map(|(_, n)| n.elem_id.clone()).collect();
        assert_eq!(order, ["a", "b"]);
    }

    #[test]
    fn settle_applies_transition_targets() {
        let mut scene = Scene::new();
        let id = scene.insert(rect_node("a"));
        scene.schedule(Transition::new(
            id,
            250.0,
            850.0,
            vec![AttrTarget::Shape(Shape::Rect(Rect::new(
                0.0, 5.0, 10.0, 10.0,
            )))],
        ));
        scene.settle();
        let Shape::Rect(r) = &scene.node(id).unwrap().shape else {
            panic!("expected rect");
        };
        assert!((r.y0 - 5.0).abs() < 1e-9);
        assert!(!scene.has_active_transitions());
    }
}
