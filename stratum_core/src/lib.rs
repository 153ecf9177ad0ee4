// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Substrate primitives for stratum charts.
//!
//! This crate models the drawing surface a chart renders into:
//! - A [`Scene`] is a retained, ordered collection of vector [`Node`]s
//!   (insertion order is paint order, like document order in an SVG tree).
//! - [`Transition`]s animate node attributes over a fixed wall-clock
//!   duration; they are cooperative (advanced by [`Scene::tick`]) and
//!   last-write-wins per node attribute.
//! - A [`Surface`] wraps a scene with a size, hover bindings, and pointer
//!   dispatch, and is shared through a single-threaded [`SurfaceHandle`].
//! - [`SurfaceProvider`] resolves a [`SurfaceSpec`] into a handle, replacing
//!   ambient document lookups with an injected collaborator.
//!
//! Geometry uses [`kurbo`]; paints use [`peniko`].

mod scene;
mod surface;
mod transition;

pub use scene::{Node, NodeId, Scene, Shape, TextAnchor, TextShape};
pub use surface::{
    HoverAction, HoverBinding, MountRegistry, Surface, SurfaceError, SurfaceHandle, SurfaceProvider,
    SurfaceSpec, surface_node_id,
};
pub use transition::{AttrTarget, Transition};
