// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fail-safe region (FSR).
//!
//! The FSR reserves extra margin and shrinks the usable drawing area so the
//! largest rendered label cannot be clipped by the surface edge. It is
//! computed once at layer construction from font metrics and the widest
//! value the layer will print, and later consumed by scale derivation
//! (which folds the safety margins into pixel ranges).

use crate::config::{Area, SafeOverride};
use crate::data::format_datum;

/// Safety margins reserved on each side, plus the z safety constant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SafeMargin {
    /// Reserved above the plot.
    pub top: f64,
    /// Reserved left of the plot.
    pub left: f64,
    /// Reserved right of the plot.
    pub right: f64,
    /// Reserved below the plot.
    pub bottom: f64,
    /// Safety constant for radius-like dimensions.
    pub z: f64,
}

/// The shrunk drawing area that remains after safety insets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SafeArea {
    /// Usable width.
    pub x: f64,
    /// Usable height.
    pub y: f64,
    /// Radius headroom.
    pub z: f64,
}

/// Fail-safe margins, shrunk area, and the domain-padding tolerance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SafeRegion {
    /// Safety margins.
    pub margin: SafeMargin,
    /// Shrunk usable area.
    pub area: SafeArea,
    /// Domain padding ratio used by focus auto-derivation (0.1 when the
    /// FSR is enabled, 0 otherwise).
    pub range: f64,
}

impl SafeRegion {
    /// The all-zero region used when the FSR is explicitly disabled.
    ///
    /// Margins and tolerance are zero; the usable area stays at the nominal
    /// drawing area.
    pub fn disabled(area: Area) -> Self {
        Self {
            margin: SafeMargin::default(),
            area: SafeArea {
                x: area.x,
                y: area.y,
                z: 0.0,
            },
            range: 0.0,
        }
    }

    /// Computes default fail-safe values.
    ///
    /// `y_max` is the largest value the layer will print; its rendered
    /// width drives the side margin reserved for tick labels. When the y
    /// axis is right-anchored the wide reservation flips sides.
    pub fn computed(font_size: f64, y_max: f64, area: Area, right_axis: bool) -> Self {
        let digits = format_datum(y_max).chars().count();
        let label_width = font_size * if digits == 1 { 2.0 } else { digits as f64 };
        Self {
            margin: SafeMargin {
                top: font_size * 4.0,
                left: if right_axis { font_size } else { label_width },
                right: if right_axis { label_width } else { font_size },
                bottom: 0.0,
                z: 10.0,
            },
            area: SafeArea {
                x: area.x - font_size,
                y: area.y - font_size * 3.0,
                z: (area.x / 4.0).floor(),
            },
            range: 0.1,
        }
    }

    /// Merges caller overrides over the zeroed base region.
    pub fn overridden(area: Area, ov: &SafeOverride) -> Self {
        let base = Self::disabled(area);
        Self {
            margin: SafeMargin {
                top: ov.margin.top.unwrap_or(base.margin.top),
                left: ov.margin.left.unwrap_or(base.margin.left),
                right: ov.margin.right.unwrap_or(base.margin.right),
                bottom: ov.margin.bottom.unwrap_or(base.margin.bottom),
                z: ov.margin.z.unwrap_or(base.margin.z),
            },
            area: SafeArea {
                x: ov.area.x.unwrap_or(base.area.x),
                y: ov.area.y.unwrap_or(base.area.y),
                z: ov.area.z.unwrap_or(base.area.z),
            },
            range: ov.range.unwrap_or(base.range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SafeMarginOverride;

    const AREA: Area = Area {
        x: 300.0,
        y: 150.0,
        z: 37.0,
    };

    #[test]
    fn computed_reserves_label_width_on_the_axis_side() {
        let fsr = SafeRegion::computed(10.0, 270.0, AREA, false);
        assert!((fsr.margin.top - 40.0).abs() < 1e-9);
        // "270" renders three glyphs wide.
        assert!((fsr.margin.left - 30.0).abs() < 1e-9);
        assert!((fsr.margin.right - 10.0).abs() < 1e-9);
        assert!((fsr.range - 0.1).abs() < 1e-9);

        let flipped = SafeRegion::computed(10.0, 270.0, AREA, true);
        assert!((flipped.margin.left - 10.0).abs() < 1e-9);
        assert!((flipped.margin.right - 30.0).abs() < 1e-9);
    }

    #[test]
    fn single_digit_maximum_still_reserves_two_glyphs() {
        let fsr = SafeRegion::computed(10.0, 7.0, AREA, false);
        assert!((fsr.margin.left - 20.0).abs() < 1e-9);
    }

    #[test]
    fn computed_shrinks_the_area() {
        let fsr = SafeRegion::computed(10.0, 100.0, AREA, false);
        assert!((fsr.area.x - 290.0).abs() < 1e-9);
        assert!((fsr.area.y - 120.0).abs() < 1e-9);
        assert!((fsr.area.z - 75.0).abs() < 1e-9);
    }

    #[test]
    fn computed_is_idempotent() {
        let a = SafeRegion::computed(12.0, 1234.0, AREA, false);
        let b = SafeRegion::computed(12.0, 1234.0, AREA, false);
        assert_eq!(a, b);
    }

    #[test]
    fn disabled_zeroes_margins_but_keeps_the_area() {
        let fsr = SafeRegion::disabled(AREA);
        assert_eq!(fsr.margin, SafeMargin::default());
        assert!((fsr.area.x - 300.0).abs() < 1e-9);
        assert!((fsr.range - 0.0).abs() < 1e-9);
    }

    #[test]
    fn overrides_merge_field_wise() {
        let ov = SafeOverride {
            margin: SafeMarginOverride {
                left: Some(44.0),
                ..SafeMarginOverride::default()
            },
            ..SafeOverride::default()
        };
        let fsr = SafeRegion::overridden(AREA, &ov);
        assert!((fsr.margin.left - 44.0).abs() < 1e-9);
        assert!((fsr.margin.top - 0.0).abs() < 1e-9);
        assert!((fsr.area.x - 300.0).abs() < 1e-9);
    }
}
