// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pie / donut rendering.
//!
//! Pies do not participate in the shared auto-scale mechanism: slice
//! geometry is pure angular math over the data proportions, remapped into
//! the configured `[rad_start, rad_end]` sweep. Labels park in a gutter at
//! the right edge of the drawing area, at each slice centroid's height.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{BezPath, Circle, Point, Rect, Shape as KurboShape};
use peniko::Color;
use stratum_core::{AttrTarget, Node, Shape, SurfaceHandle, TextAnchor, TextShape, Transition};

use crate::config::{Area, PieConfig};
use crate::data::DataVector;
use crate::error::ChartError;
use crate::layer::{ENTRY_DELAY_MS, ENTRY_MS, Layer, Variant};

/// Pie updates animate at the same leisurely pace as bars.
const PIE_UPDATE_MS: f64 = 500.0;
/// Flattening tolerance when converting sectors to paths.
const ARC_TOLERANCE: f64 = 0.1;

/// Normalized angular/radial parameters of a pie layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieParams {
    /// Sweep start in radians, clockwise from 12 o'clock.
    pub rad_start: f64,
    /// Sweep end in radians.
    pub rad_end: f64,
    /// Fraction of the full circle covered, signed by direction.
    pub rad_range: f64,
    /// Inner radius (donut hole).
    pub inner_radius: f64,
    /// Outer radius.
    pub radius: f64,
}

impl PieParams {
    /// Normalizes a pie configuration against the drawing area.
    pub fn from_config(conf: &PieConfig, area: Area) -> Self {
        let radius = conf
            .radius
            .unwrap_or_else(|| (area.x * area.y).sqrt() / 2.5);
        let rad_start = conf.rad_start.unwrap_or(0.0);
        let mut rad_end = conf.rad_end.unwrap_or(TAU);
        if rad_end == rad_start {
            rad_end += TAU;
        }
        let mut rad_range = (rad_end - rad_start) / TAU;
        if !conf.clockwise {
            rad_range = -rad_range;
        }
        Self {
            rad_start,
            rad_end,
            rad_range,
            inner_radius: conf.inner_radius.unwrap_or(0.0),
            radius,
        }
    }

    /// Start/end angles per datum, proportional to the values and remapped
    /// into the configured sweep.
    pub fn angles(&self, values: &[f64]) -> Vec<(f64, f64)> {
        let total: f64 = values.iter().sum();
        let n = values.len();
        let mut acc = 0.0;
        values
            .iter()
            .map(|&v| {
                let frac = if total != 0.0 { v / total } else { 1.0 / n as f64 };
                let raw_start = acc * TAU;
                acc += frac;
                let raw_end = acc * TAU;
                (
                    raw_start * self.rad_range + self.rad_start,
                    raw_end * self.rad_range + self.rad_start,
                )
            })
            .collect()
    }
}

/// An approximation of the spectral color ramp used for default slice
/// fills.
pub(crate) fn spectral(t: f64) -> Color {
    const ANCHORS: [(u8, u8, u8); 5] = [
        (158, 1, 66),
        (244, 109, 67),
        (255, 255, 191),
        (102, 194, 165),
        (94, 79, 162),
    ];
    let t = t.clamp(0.0, 1.0) * (ANCHORS.len() - 1) as f64;
    let i = (t.floor() as usize).min(ANCHORS.len() - 2);
    let f = t - i as f64;
    let (a, b) = (ANCHORS[i], ANCHORS[i + 1]);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * f).round() as u8;
    Color::from_rgba8(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2), 255)
}

/// Builds the sector path for one slice. Angles are clockwise from 12
/// o'clock (the convention of [`PieParams::angles`]).
fn sector_path(center: Point, inner: f64, outer: f64, start: f64, end: f64) -> BezPath {
    let (mut a0, mut sweep) = (start, end - start);
    if sweep < 0.0 {
        a0 += sweep;
        sweep = -sweep;
    }
    let circle = Circle::new(center, outer);
    let segment = circle.segment(inner, a0 - FRAC_PI_2, sweep);
    segment.path_elements(ARC_TOLERANCE).collect()
}

impl Layer {
    fn pie_params(&self) -> Result<PieParams, ChartError> {
        match &self.variant {
            Variant::Pie(p) => Ok(*p),
            _ => Err(ChartError::ScaleNotReady(self.id.clone())),
        }
    }

    fn pie_center(&self, params: &PieParams) -> Point {
        Point::new(
            params.radius + self.margin.left,
            params.radius + self.margin.top,
        )
    }

    fn pie_values(&self) -> Result<Vec<f64>, ChartError> {
        match &self.data {
            DataVector::Scalars(v) => Ok(v.clone()),
            _ => Err(ChartError::NotOneDimensional),
        }
    }

    pub(crate) fn render_pie(&mut self) -> Result<(), ChartError> {
        let params = self.pie_params()?;
        let values = self.pie_values()?;
        let center = self.pie_center(&params);
        let angles = params.angles(&values);
        let n = values.len();
        let animated = self.animated;

        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.el.shapes.clear();
        for (i, ((start, end), &v)) in angles.iter().zip(values.iter()).enumerate() {
            let path = sector_path(center, params.inner_radius, params.radius, *start, *end);
            let fill = if self.color.fill.is_per_datum() {
                self.color.fill.resolve(v, i)
            } else {
                spectral(i as f64 / n as f64)
            };
            let stroke = self.color.stroke.resolve(v, i);
            let node = Node::new(self.elem_id("arc", i), Shape::Path(path))
                .with_class("st-pie-arc")
                .with_pointer_events();
            let node = if animated {
                node
            } else {
                node.with_fill(fill).with_stroke(stroke, 1.0)
            };
            let id = surface.scene.insert(node);
            if animated {
                surface.scene.schedule(Transition::new(
                    id,
                    ENTRY_DELAY_MS,
                    ENTRY_MS,
                    vec![
                        AttrTarget::Fill(fill.into()),
                        AttrTarget::Stroke(stroke.into()),
                    ],
                ));
            }
            self.el.shapes.push(id);
        }
        // Arc sectors are their own hit-test shapes.
        self.el.collision = self.el.shapes.clone();
        Ok(())
    }

    pub(crate) fn update_pie(&mut self, data: DataVector) -> Result<(), ChartError> {
        self.update_data_core(data)?;
        let params = self.pie_params()?;
        let values = self.pie_values()?;
        let center = self.pie_center(&params);
        let angles = params.angles(&values);

        let svg = SurfaceHandle::clone(&self.svg);
        {
            let mut surface = svg.borrow_mut();
            for (&id, (start, end)) in self.el.shapes.iter().zip(angles.iter()) {
                let path = sector_path(center, params.inner_radius, params.radius, *start, *end);
                surface.scene.schedule(Transition::new(
                    id,
                    0.0,
                    PIE_UPDATE_MS,
                    vec![AttrTarget::Shape(Shape::Path(path))],
                ));
            }
        }
        if !self.el.labels.is_empty() {
            self.unset_label();
            self.set_label(true)?;
        }
        Ok(())
    }

    /// Pie labels: a rounded backdrop and text in the right-edge gutter, at
    /// each slice centroid's height.
    pub(crate) fn set_label_pie(&mut self, fade: bool) -> Result<(), ChartError> {
        let params = self.pie_params()?;
        let values = self.pie_values()?;
        let center = self.pie_center(&params);
        let angles = params.angles(&values);
        let labels = self.label_array();
        let rect_w = self.label_width();
        let rect_h = self.font.size * 2.0;
        let right_limit = self.area.x - self.safe.margin.left - rect_w * 2.0;
        let backdrop = if fade {
            Color::TRANSPARENT
        } else {
            self.color.text_background
        };
        let text_color = if fade {
            Color::TRANSPARENT
        } else {
            self.color.text
        };

        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.unset_label_in(&mut surface.scene);
        for (i, (start, end)) in angles.iter().enumerate() {
            let mid = (start + end) / 2.0;
            let centroid_y = center.y
                + (mid - FRAC_PI_2).sin() * (params.inner_radius + params.radius) / 2.0;
            let rect = Node::new(
                format!("{}_bubble", self.elem_id("label", i)),
                Shape::Rect(Rect::new(
                    right_limit - rect_w / 2.0,
                    centroid_y - rect_h / 1.5,
                    right_limit + rect_w / 2.0,
                    centroid_y + rect_h / 3.0,
                )),
            )
            .with_class("st-label")
            .with_fill(backdrop)
            .with_stroke(backdrop, 1.0);
            let mut text_shape = TextShape::new(
                Point::new(right_limit, centroid_y + self.font.size * 0.35),
                labels[i].clone(),
                self.font.size,
            );
            text_shape.anchor = TextAnchor::Middle;
            let text = Node::new(
                format!("{}_text", self.elem_id("label", i)),
                Shape::Text(text_shape),
            )
            .with_class("st-label")
            .with_fill(text_color);
            let rect_id = surface.scene.insert(rect);
            let text_id = surface.scene.insert(text);
            self.el.labels.push((rect_id, text_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use stratum_core::{MountRegistry, SurfaceSpec};

    use super::*;
    use crate::config::{LayerConfig, VariantKind};

    fn area() -> Area {
        Area {
            x: 300.0,
            y: 150.0,
            z: 37.0,
        }
    }

    #[test]
    fn angles_are_proportional_and_cover_the_sweep() {
        let params = PieParams::from_config(&PieConfig::new(), area());
        let angles = params.angles(&[1.0, 1.0, 2.0]);
        assert_eq!(angles.len(), 3);
        assert!((angles[0].0 - 0.0).abs() < 1e-9);
        assert!((angles[2].1 - TAU).abs() < 1e-9);
        // The doubled value gets half the circle.
        assert!(((angles[2].1 - angles[2].0) - PI).abs() < 1e-9);
    }

    #[test]
    fn partial_sweep_remaps_and_anticlockwise_negates() {
        let conf = PieConfig {
            rad_start: Some(FRAC_PI_2),
            rad_end: Some(PI * 3.0 / 2.0),
            clockwise: false,
            ..PieConfig::new()
        };
        let params = PieParams::from_config(&conf, area());
        let angles = params.angles(&[1.0, 1.0]);
        assert!((angles[0].0 - FRAC_PI_2).abs() < 1e-9);
        // Anti-clockwise sweeps run backwards from the start angle.
        assert!(angles[0].1 < angles[0].0);
        let total_sweep: f64 = angles.iter().map(|(s, e)| e - s).sum();
        assert!((total_sweep + PI).abs() < 1e-9);
    }

    #[test]
    fn coincident_start_and_end_fall_back_to_a_full_circle() {
        let conf = PieConfig {
            rad_start: Some(1.0),
            rad_end: Some(1.0),
            ..PieConfig::new()
        };
        let params = PieParams::from_config(&conf, area());
        assert!((params.rad_range - 1.0).abs() < 1e-9);
    }

    #[test]
    fn render_creates_one_sector_per_datum() {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let conf = LayerConfig::new(
            "p62",
            VariantKind::Pie,
            vec![21.0, 12.0, 11.0, 27.0],
        )
        .with_column(vec!["liberty", "power", "wise", "humor"])
        .with_animation(false)
        .with_surface(SurfaceSpec::Mount {
            target: "chart".into(),
            width: 300.0,
            height: 300.0,
        });
        let mut layer = Layer::new(conf, &mut reg).unwrap();
        layer.render().unwrap();
        assert_eq!(layer.shape_nodes().len(), 4);
        assert_eq!(layer.collision_nodes().len(), 4);
        layer.set_label(true).unwrap();
        assert_eq!(layer.label_nodes().len(), 4);
    }
}
