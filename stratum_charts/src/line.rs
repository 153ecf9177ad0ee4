// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line rendering.
//!
//! A single path through the normalized points, optionally smoothed with a
//! monotone-x cubic (no overshoot between samples). Line layers draw point
//! markers on top by default and use band rectangles or enlarged circles
//! for hit testing depending on the x scale.

use kurbo::BezPath;
use peniko::{Brush, Color};
use stratum_core::{AttrTarget, Node, Shape, SurfaceHandle, Transition};

use crate::data::DataVector;
use crate::error::ChartError;
use crate::layer::{ENTRY_DELAY_MS, ENTRY_MS, Layer, UPDATE_MS, Variant};

pub(crate) fn polyline(pts: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    for (i, &(x, y)) in pts.iter().enumerate() {
        if i == 0 {
            path.move_to((x, y));
        } else {
            path.line_to((x, y));
        }
    }
    path
}

fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

fn slope3(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let h0 = p1.0 - p0.0;
    let h1 = p2.0 - p1.0;
    let s0 = (p1.1 - p0.1) / if h0 != 0.0 { h0 } else { sign(h1).max(1e-12) };
    let s1 = (p2.1 - p1.1) / if h1 != 0.0 { h1 } else { sign(h0).max(1e-12) };
    let p = (s0 * h1 + s1 * h0) / (h0 + h1);
    let m = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if m.is_finite() { m } else { 0.0 }
}

fn slope2(p0: (f64, f64), p1: (f64, f64), t: f64) -> f64 {
    let h = p1.0 - p0.0;
    if h != 0.0 {
        (3.0 * (p1.1 - p0.1) / h - t) / 2.0
    } else {
        t
    }
}

/// A monotone-x cubic through `pts`: interpolation never overshoots the
/// data between adjacent samples.
pub(crate) fn monotone_x_path(pts: &[(f64, f64)]) -> BezPath {
    let n = pts.len();
    if n < 3 {
        return polyline(pts);
    }
    let mut m = vec![0.0; n];
    for i in 1..n - 1 {
        m[i] = slope3(pts[i - 1], pts[i], pts[i + 1]);
    }
    m[0] = slope2(pts[0], pts[1], m[1]);
    m[n - 1] = slope2(pts[n - 2], pts[n - 1], m[n - 2]);

    let mut path = BezPath::new();
    path.move_to(pts[0]);
    for i in 0..n - 1 {
        let (x0, y0) = pts[i];
        let (x1, y1) = pts[i + 1];
        let dx = (x1 - x0) / 3.0;
        path.curve_to(
            (x0 + dx, y0 + dx * m[i]),
            (x1 - dx, y1 - dx * m[i + 1]),
            (x1, y1),
        );
    }
    path
}

impl Layer {
    pub(crate) fn line_coords(&self) -> Result<Vec<(f64, f64)>, ChartError> {
        let ds = self.data_scales()?;
        let pts = self.normalized_xy_data()?;
        Ok(pts
            .iter()
            .enumerate()
            .map(|(i, p)| (ds.x(p, i), ds.y(p)))
            .collect())
    }

    fn line_path(&self) -> Result<BezPath, ChartError> {
        let coords = self.line_coords()?;
        let smooth = matches!(self.variant, Variant::Line { smooth: true, .. });
        Ok(if smooth {
            monotone_x_path(&coords)
        } else {
            polyline(&coords)
        })
    }

    pub(crate) fn render_line(&mut self) -> Result<(), ChartError> {
        self.render_axes()?;
        let path = self.line_path()?;
        let stroke = self
            .color
            .stroke
            .resolve(self.y_source_values().first().copied().unwrap_or(0.0), 0);
        let animated = self.animated;
        let with_plot = matches!(self.variant, Variant::Line { plot: true, .. });

        {
            let svg = SurfaceHandle::clone(&self.svg);
            let mut surface = svg.borrow_mut();
            let node = Node::new(self.elem_id_single("line"), Shape::Path(path))
                .with_class("st-line")
                .with_fill(Color::TRANSPARENT)
                .with_stroke(
                    if animated { Color::TRANSPARENT } else { stroke },
                    1.0,
                );
            let id = surface.scene.insert(node);
            if animated {
                surface.scene.schedule(Transition::new(
                    id,
                    ENTRY_DELAY_MS,
                    ENTRY_MS,
                    vec![AttrTarget::Stroke(Brush::Solid(stroke))],
                ));
            }
            self.el.shapes = vec![id];
        }

        if with_plot {
            self.render_plot()?;
        }
        if self.data_scales()?.is_band() {
            self.set_collision_bar()
        } else {
            self.set_collision()
        }
    }

    pub(crate) fn update_line(&mut self, data: DataVector) -> Result<(), ChartError> {
        self.update_data_core(data)?;
        self.auto_scale()?;
        let path = self.line_path()?;
        let svg = SurfaceHandle::clone(&self.svg);
        {
            let mut surface = svg.borrow_mut();
            if let Some(&line) = self.el.shapes.first() {
                surface.scene.schedule(Transition::new(
                    line,
                    0.0,
                    UPDATE_MS,
                    vec![AttrTarget::Shape(Shape::Path(path))],
                ));
            }
        }
        self.refresh_collision()?;
        if matches!(self.variant, Variant::Line { plot: true, .. }) {
            self.rerender_plot()?;
        }
        if !self.el.labels.is_empty() {
            self.unset_label();
            self.set_label(true)?;
        }
        Ok(())
    }

    /// Moves circle hit-test shapes to the current data positions. Band
    /// hit-test rectangles cover fixed slots and need no refresh.
    pub(crate) fn refresh_collision(&mut self) -> Result<(), ChartError> {
        let ds = self.data_scales()?;
        if ds.is_band() {
            return Ok(());
        }
        let pts = self.normalized_xy_data()?;
        let r = self.font.size * 1.5;
        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        for (i, (&id, p)) in self.el.collision.iter().zip(pts.iter()).enumerate() {
            surface.scene.schedule(Transition::new(
                id,
                0.0,
                UPDATE_MS,
                vec![AttrTarget::Shape(Shape::Circle(kurbo::Circle::new(
                    kurbo::Point::new(ds.x(p, i), ds.y(p)),
                    r,
                )))],
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stratum_core::{MountRegistry, SurfaceSpec};

    use super::*;
    use crate::config::{LayerConfig, VariantKind};

    fn line_layer(conf: LayerConfig) -> Layer {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let mut layer = Layer::new(
            conf.with_surface(SurfaceSpec::Mount {
                target: "chart".into(),
                width: 300.0,
                height: 150.0,
            }),
            &mut reg,
        )
        .unwrap();
        layer.auto_scale().unwrap();
        layer
    }

    #[test]
    fn monotone_path_stays_within_the_sample_envelope() {
        let pts = [(0.0, 0.0), (10.0, 10.0), (20.0, 10.0), (30.0, 0.0)];
        let path = monotone_x_path(&pts);
        let bounds = kurbo::Shape::bounding_box(&path);
        assert!(bounds.y0 >= -1e-6);
        assert!(bounds.y1 <= 10.0 + 1e-6);
    }

    #[test]
    fn categorical_line_uses_band_hit_rects_and_plot_markers() {
        let conf = LayerConfig::new("l", VariantKind::Line, vec![1.0, 2.0, 3.0])
            .with_column(vec!["adventure", "beginning", "city"])
            .with_animation(false);
        let mut layer = line_layer(conf);
        layer.render().unwrap();
        assert_eq!(layer.shape_nodes().len(), 1);
        assert_eq!(layer.collision_nodes().len(), 3);
        assert_eq!(layer.el.plot.len(), 3);
    }

    #[test]
    fn numeric_column_switches_to_continuous_scales() {
        let conf = LayerConfig::new("l", VariantKind::Line, vec![2008.0, 2005.0, 2001.0])
            .with_column(vec![1020.0, 1292.0, 1319.0])
            .with_animation(false);
        let mut layer = line_layer(conf);
        layer.render().unwrap();
        assert!(layer.scales().unwrap().x.as_linear().is_some());
        // Continuous x uses circle hit shapes.
        let surface = layer.surface();
        let surface = surface.borrow();
        let circles = surface
            .scene
            .nodes()
            .filter(|(_, n)| n.elem_id.contains("_collision_"))
            .count();
        assert_eq!(circles, 3);
    }

    #[test]
    fn update_keeps_the_path_but_moves_it() {
        let conf = LayerConfig::new("l", VariantKind::Line, vec![1.0, 2.0, 3.0])
            .with_column(vec!["a", "b", "c"])
            .with_animation(false);
        let mut layer = line_layer(conf);
        layer.render().unwrap();
        let line = layer.shape_nodes()[0];
        layer.update_data(vec![10.0, 20.0, 3_000_000.0]).unwrap();
        layer.surface().borrow_mut().scene.settle();
        let surface = layer.surface();
        let surface = surface.borrow();
        let Shape::Path(p) = &surface.scene.node(line).unwrap().shape else {
            panic!("expected path");
        };
        assert!(!p.elements().is_empty());
    }
}
