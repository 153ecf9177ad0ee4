// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label bubble geometry.
//!
//! The hover label for a datum is a speech-bubble outline: a box sized to
//! the widest label in the set, with a triangular pointer whose tip sits on
//! the anchor point (the topmost point of the datum's shape). This is pure
//! geometry so it can be tested without a surface.

use kurbo::{BezPath, Point};

/// Builds the speech-bubble outline for a label.
///
/// `anchor` is the pointer tip. The box spans `width` horizontally, centered
/// on the anchor, and sits above it; `height` is the box height and
/// `font_size` controls the pointer notch width.
pub fn bubble_outline(anchor: Point, width: f64, height: f64, font_size: f64) -> BezPath {
    let half_w = width / 2.0;
    let notch = font_size / 2.0;
    let shoulder_y = anchor.y - height / 3.0;
    let top_y = anchor.y - height * 1.5;

    let mut p = BezPath::new();
    p.move_to(anchor);
    p.line_to((anchor.x - notch, shoulder_y));
    p.line_to((anchor.x - half_w, shoulder_y));
    p.line_to((anchor.x - half_w, top_y));
    p.line_to((anchor.x + half_w, top_y));
    p.line_to((anchor.x + half_w, shoulder_y));
    p.line_to((anchor.x + notch, shoulder_y));
    p.close_path();
    p
}

/// Baseline position for the text centered inside a bubble built by
/// [`bubble_outline`] with the same inputs.
pub fn bubble_text_pos(anchor: Point, height: f64, font_size: f64) -> Point {
    // Box midline, nudged down so the baseline centers the glyphs.
    Point::new(anchor.x, anchor.y - height * 11.0 / 12.0 + font_size * 0.35)
}

#[cfg(test)]
mod tests {
    use kurbo::Shape as _;

    use super::*;

    #[test]
    fn outline_is_closed_and_starts_at_the_anchor() {
        let anchor = Point::new(50.0, 80.0);
        let path = bubble_outline(anchor, 40.0, 20.0, 10.0);
        let els = path.elements();
        assert!(matches!(els.first(), Some(kurbo::PathEl::MoveTo(p)) if *p == anchor));
        assert!(matches!(els.last(), Some(kurbo::PathEl::ClosePath)));
    }

    #[test]
    fn outline_spans_the_requested_width_above_the_anchor() {
        let anchor = Point::new(50.0, 80.0);
        let b = bubble_outline(anchor, 40.0, 20.0, 10.0).bounding_box();
        assert!((b.width() - 40.0).abs() < 1e-9);
        assert!((b.y1 - 80.0).abs() < 1e-9);
        assert!(b.y0 < 80.0);
    }

    #[test]
    fn text_sits_inside_the_box() {
        let anchor = Point::new(0.0, 0.0);
        let pos = bubble_text_pos(anchor, 20.0, 10.0);
        let bounds = bubble_outline(anchor, 40.0, 20.0, 10.0).bounding_box();
        assert!(pos.y > bounds.y0 && pos.y < bounds.y1);
    }
}
