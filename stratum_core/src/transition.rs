// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute transitions.
//!
//! A [`Transition`] moves one node's attributes toward target values over a
//! fixed wall-clock duration, after an optional delay. Transitions are
//! advanced cooperatively by [`Scene::tick`](crate::Scene::tick) and never
//! block; scheduling a second transition for the same attribute replaces the
//! first (last-write-wins on the underlying attribute, not serialized).

use kurbo::{BezPath, Circle, PathEl, Point, Rect};
use peniko::{Brush, Color};

use crate::scene::{Node, NodeId, Shape};

/// A target attribute value for a transition.
#[derive(Clone, Debug)]
pub enum AttrTarget {
    /// Animate the node's geometry toward this shape.
    ///
    /// Rect→rect and circle→circle interpolate componentwise. Path→path
    /// interpolates pointwise when the element structure matches (the usual
    /// case for a same-length data update) and snaps at completion
    /// otherwise. Text snaps at completion.
    Shape(Shape),
    /// Animate the fill paint. Solid→solid interpolates in RGBA; any other
    /// pairing snaps at completion.
    Fill(Brush),
    /// Animate the stroke paint (same rules as `Fill`).
    Stroke(Brush),
    /// Animate the stroke width.
    StrokeWidth(f64),
}

impl AttrTarget {
    fn kind(&self) -> u8 {
        match self {
            Self::Shape(_) => 0,
            Self::Fill(_) => 1,
            Self::Stroke(_) => 2,
            Self::StrokeWidth(_) => 3,
        }
    }

    fn capture(&self, node: &Node) -> Self {
        match self {
            Self::Shape(_) => Self::Shape(node.shape.clone()),
            Self::Fill(_) => Self::Fill(node.fill.clone()),
            Self::Stroke(_) => Self::Stroke(node.stroke.clone()),
            Self::StrokeWidth(_) => Self::StrokeWidth(node.stroke_width),
        }
    }

    fn apply(&self, node: &mut Node) {
        match self {
            Self::Shape(s) => node.shape = s.clone(),
            Self::Fill(b) => node.fill = b.clone(),
            Self::Stroke(b) => node.stroke = b.clone(),
            Self::StrokeWidth(w) => node.stroke_width = *w,
        }
    }

    fn apply_lerped(&self, from: &Self, t: f64, node: &mut Node) {
        match (from, self) {
            (Self::Shape(a), Self::Shape(b)) => {
                if let Some(s) = lerp_shape(a, b, t) {
                    node.shape = s;
                }
            }
            (Self::Fill(a), Self::Fill(b)) => {
                if let Some(brush) = lerp_brush(a, b, t) {
                    node.fill = brush;
                }
            }
            (Self::Stroke(a), Self::Stroke(b)) => {
                if let Some(brush) = lerp_brush(a, b, t) {
                    node.stroke = brush;
                }
            }
            (Self::StrokeWidth(a), Self::StrokeWidth(b)) => {
                node.stroke_width = lerp(*a, *b, t);
            }
            _ => {}
        }
    }
}

/// A scheduled attribute animation on one node.
#[derive(Clone, Debug)]
pub struct Transition {
    /// The animated node.
    pub node: NodeId,
    /// Delay before the animation starts, in milliseconds.
    pub delay: f64,
    /// Animation duration in milliseconds.
    pub duration: f64,
    targets: Vec<AttrTarget>,
    from: Option<Vec<AttrTarget>>,
    elapsed: f64,
}

impl Transition {
    /// Creates a transition toward `targets`.
    pub fn new(node: NodeId, delay: f64, duration: f64, targets: Vec<AttrTarget>) -> Self {
        Self {
            node,
            delay,
            duration,
            targets,
            from: None,
            elapsed: 0.0,
        }
    }

    /// Drops targets that `other` also animates, so `other` wins.
    pub(crate) fn drop_attrs_of(&mut self, other: &Self) {
        self.targets
            .retain(|t| !other.targets.iter().any(|o| o.kind() == t.kind()));
        if let Some(from) = &mut self.from {
            from.retain(|t| !other.targets.iter().any(|o| o.kind() == t.kind()));
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.targets.is_empty()
    }

    /// Advances by `dt_ms`; returns true when the transition completed.
    pub(crate) fn advance(&mut self, node: &mut Node, dt_ms: f64) -> bool {
        self.elapsed += dt_ms;
        if self.elapsed < self.delay {
            return false;
        }
        // Start values are sampled when the delay expires, so an earlier
        // animation that is still running hands over mid-flight state.
        let from = self
            .from
            .get_or_insert_with(|| self.targets.iter().map(|t| t.capture(node)).collect());
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
        };
        if t >= 1.0 {
            self.apply_final(node);
            return true;
        }
        let eased = ease_cubic_in_out(t);
        for (target, start) in self.targets.iter().zip(from.iter()) {
            target.apply_lerped(start, eased, node);
        }
        false
    }

    /// Applies final target values without interpolation.
    pub(crate) fn apply_final(&self, node: &mut Node) {
        for target in &self.targets {
            target.apply(node);
        }
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 2.0 * t - 2.0;
        0.5 * u * u * u + 1.0
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

fn lerp_shape(a: &Shape, b: &Shape, t: f64) -> Option<Shape> {
    match (a, b) {
        (Shape::Rect(ra), Shape::Rect(rb)) => Some(Shape::Rect(Rect::new(
            lerp(ra.x0, rb.x0, t),
            lerp(ra.y0, rb.y0, t),
            lerp(ra.x1, rb.x1, t),
            lerp(ra.y1, rb.y1, t),
        ))),
        (Shape::Circle(ca), Shape::Circle(cb)) => Some(Shape::Circle(Circle::new(
            lerp_point(ca.center, cb.center, t),
            lerp(ca.radius, cb.radius, t),
        ))),
        (Shape::Path(pa), Shape::Path(pb)) => lerp_path(pa, pb, t).map(Shape::Path),
        // Text (and mismatched pairings) snap when the transition completes.
        _ => None,
    }
}

fn lerp_path(a: &BezPath, b: &BezPath, t: f64) -> Option<BezPath> {
    let ea = a.elements();
    let eb = b.elements();
    if ea.len() != eb.len() {
        return None;
    }
    let mut out = BezPath::new();
    for (pa, pb) in ea.iter().zip(eb.iter()) {
        let el = match (pa, pb) {
            (PathEl::MoveTo(p0), PathEl::MoveTo(p1)) => PathEl::MoveTo(lerp_point(*p0, *p1, t)),
            (PathEl::LineTo(p0), PathEl::LineTo(p1)) => PathEl::LineTo(lerp_point(*p0, *p1, t)),
            (PathEl::QuadTo(a0, a1), PathEl::QuadTo(b0, b1)) => {
                PathEl::QuadTo(lerp_point(*a0, *b0, t), lerp_point(*a1, *b1, t))
            }
            (PathEl::CurveTo(a0, a1, a2), PathEl::CurveTo(b0, b1, b2)) => PathEl::CurveTo(
                lerp_point(*a0, *b0, t),
                lerp_point(*a1, *b1, t),
                lerp_point(*a2, *b2, t),
            ),
            (PathEl::ClosePath, PathEl::ClosePath) => PathEl::ClosePath,
            _ => return None,
        };
        out.push(el);
    }
    Some(out)
}

fn lerp_brush(a: &Brush, b: &Brush, t: f64) -> Option<Brush> {
    match (a, b) {
        (Brush::Solid(ca), Brush::Solid(cb)) => Some(Brush::Solid(lerp_color(*ca, *cb, t))),
        _ => None,
    }
}

fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    let ra = a.to_rgba8();
    let rb = b.to_rgba8();
    let mix = |x: u8, y: u8| -> u8 {
        let v = f64::from(x) + (f64::from(y) - f64::from(x)) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    Color::from_rgba8(
        mix(ra.r, rb.r),
        mix(ra.g, rb.g),
        mix(ra.b, rb.b),
        mix(ra.a, rb.a),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use peniko::color::palette::css;

    fn scene_with_rect() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let id = scene.insert(
            Node::new("r", Shape::Rect(Rect::new(0.0, 100.0, 10.0, 100.0)))
                .with_fill(css::GREEN),
        );
        (scene, id)
    }

    #[test]
    fn advance_interpolates_rect_geometry() {
        let (mut scene, id) = scene_with_rect();
        scene.schedule(Transition::new(
            id,
            0.0,
            100.0,
            vec![AttrTarget::Shape(Shape::Rect(Rect::new(
                0.0, 0.0, 10.0, 100.0,
            )))],
        ));
        scene.tick(50.0);
        let Shape::Rect(r) = &scene.node(id).unwrap().shape else {
            panic!("expected rect");
        };
        assert!(r.y0 > 0.0 && r.y0 < 100.0);
        scene.tick(50.0);
        let Shape::Rect(r) = &scene.node(id).unwrap().shape else {
            panic!("expected rect");
        };
        assert!((r.y0 - 0.0).abs() < 1e-9);
        assert!(!scene.has_active_transitions());
    }

    #[test]
    fn second_schedule_replaces_first_for_same_attr() {
        let (mut scene, id) = scene_with_rect();
        scene.schedule(Transition::new(
            id,
            0.0,
            100.0,
            vec![AttrTarget::Shape(Shape::Rect(Rect::new(
                0.0, 0.0, 10.0, 100.0,
            )))],
        ));
        scene.schedule(Transition::new(
            id,
            0.0,
            100.0,
            vec![AttrTarget::Shape(Shape::Rect(Rect::new(
                0.0, 40.0, 10.0, 100.0,
            )))],
        ));
        scene.settle();
        let Shape::Rect(r) = &scene.node(id).unwrap().shape else {
            panic!("expected rect");
        };
        assert!((r.y0 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn delay_defers_the_start() {
        let (mut scene, id) = scene_with_rect();
        scene.schedule(Transition::new(
            id,
            250.0,
            100.0,
            vec![AttrTarget::StrokeWidth(5.0)],
        ));
        scene.tick(200.0);
        assert!((scene.node(id).unwrap().stroke_width - 0.0).abs() < 1e-9);
        scene.tick(200.0);
        assert!((scene.node(id).unwrap().stroke_width - 5.0).abs() < 1e-9);
    }

    #[test]
    fn solid_fill_interpolates_in_rgba() {
        let (mut scene, id) = scene_with_rect();
        scene.schedule(Transition::new(
            id,
            0.0,
            100.0,
            vec![AttrTarget::Fill(Brush::Solid(Color::from_rgba8(
                255, 0, 0, 255,
            )))],
        ));
        scene.tick(100.0);
        let Brush::Solid(c) = scene.node(id).unwrap().fill else {
            panic!("expected solid fill");
        };
        assert_eq!(c.to_rgba8().r, 255);
        assert_eq!(c.to_rgba8().g, 0);
    }
}
