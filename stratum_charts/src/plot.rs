// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scatter-plot markers.
//!
//! `render_plot` draws one small circle per datum and is shared: plot
//! layers call it as their primary draw routine, and line layers use it as
//! an overlay (useful for hover emphasis on thin lines).

use kurbo::{Circle, Point};
use stratum_core::{AttrTarget, Node, Shape, SurfaceHandle, Transition};

use crate::data::DataVector;
use crate::error::ChartError;
use crate::layer::{Layer, UPDATE_MS};

/// Marker radius in font-size units.
const MARKER_EM: f64 = 0.2;
/// Marker entry animation duration.
const MARKER_ENTRY_MS: f64 = 700.0;

impl Layer {
    /// Draws point markers for every datum, regardless of variant.
    pub(crate) fn render_plot(&mut self) -> Result<(), ChartError> {
        let ds = self.data_scales()?;
        let pts = self.normalized_xy_data()?;
        let r = self.font.size * MARKER_EM;
        let animated = self.animated;

        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.el.plot.clear();
        for (i, p) in pts.iter().enumerate() {
            let center = Point::new(ds.x(p, i), ds.y(p));
            let fill = self.color.fill.resolve(p.y, i);
            let node = Node::new(
                self.elem_id("plot", i),
                Shape::Circle(Circle::new(center, if animated { 0.0 } else { r })),
            )
            .with_class("st-plot")
            .with_fill(fill)
            .with_stroke(fill, 1.0);
            let id = surface.scene.insert(node);
            if animated {
                surface.scene.schedule(Transition::new(
                    id,
                    0.0,
                    MARKER_ENTRY_MS,
                    vec![AttrTarget::Shape(Shape::Circle(Circle::new(center, r)))],
                ));
            }
            self.el.plot.push(id);
        }
        Ok(())
    }

    /// Drops and redraws the marker overlay (used after data updates).
    pub(crate) fn rerender_plot(&mut self) -> Result<(), ChartError> {
        let svg = SurfaceHandle::clone(&self.svg);
        {
            let mut surface = svg.borrow_mut();
            for id in self.el.plot.drain(..) {
                surface.scene.remove(id);
            }
        }
        self.render_plot()
    }

    /// Primary draw routine for plot layers.
    pub(crate) fn render_plot_layer(&mut self) -> Result<(), ChartError> {
        self.render_axes()?;
        self.render_plot()?;
        // Plot layers treat their markers as shapes proper.
        self.el.shapes = self.el.plot.clone();
        self.set_collision()
    }

    pub(crate) fn update_plot(&mut self, data: DataVector) -> Result<(), ChartError> {
        self.update_data_core(data)?;
        self.auto_scale()?;
        let ds = self.data_scales()?;
        let pts = self.normalized_xy_data()?;
        let r = self.font.size * MARKER_EM;
        let svg = SurfaceHandle::clone(&self.svg);
        {
            let mut surface = svg.borrow_mut();
            for (i, (&id, p)) in self.el.plot.iter().zip(pts.iter()).enumerate() {
                surface.scene.schedule(Transition::new(
                    id,
                    0.0,
                    UPDATE_MS,
                    vec![AttrTarget::Shape(Shape::Circle(Circle::new(
                        Point::new(ds.x(p, i), ds.y(p)),
                        r,
                    )))],
                ));
            }
        }
        self.refresh_collision()?;
        if !self.el.labels.is_empty() {
            self.unset_label();
            self.set_label(true)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stratum_core::{MountRegistry, SurfaceSpec};

    use super::*;
    use crate::config::{LayerConfig, VariantKind};

    fn plot_layer(data: Vec<[f64; 2]>) -> Layer {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let conf = LayerConfig::new("p", VariantKind::Plot, data)
            .with_animation(false)
            .with_surface(SurfaceSpec::Mount {
                target: "chart".into(),
                width: 300.0,
                height: 150.0,
            });
        let mut layer = Layer::new(conf, &mut reg).unwrap();
        layer.auto_scale().unwrap();
        layer
    }

    #[test]
    fn plot_renders_markers_and_enlarged_hit_circles() {
        let mut layer = plot_layer(vec![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        layer.render().unwrap();
        assert_eq!(layer.shape_nodes().len(), 3);
        assert_eq!(layer.collision_nodes().len(), 3);
        let surface = layer.surface();
        let surface = surface.borrow();
        let (marker, hit) = (
            surface.scene.node(layer.shape_nodes()[0]).unwrap(),
            surface.scene.node(layer.collision_nodes()[0]).unwrap(),
        );
        let (Shape::Circle(m), Shape::Circle(h)) = (&marker.shape, &hit.shape) else {
            panic!("expected circles");
        };
        assert!(h.radius > m.radius);
        assert!(hit.pointer_events);
        assert!(!marker.pointer_events);
    }

    #[test]
    fn update_moves_markers_to_new_positions() {
        let mut layer = plot_layer(vec![[1.0, 2.0], [3.0, 4.0]]);
        layer.render().unwrap();
        let id = layer.shape_nodes()[0];
        let before = {
            let surface = layer.surface();
            let s = surface.borrow();
            let Shape::Circle(c) = s.scene.node(id).unwrap().shape else {
                panic!("expected circle");
            };
            c.center
        };
        layer.update_data(vec![[10.0, 2.0], [3.0, 4.0]]).unwrap();
        layer.surface().borrow_mut().scene.settle();
        let surface = layer.surface();
        let s = surface.borrow();
        let Shape::Circle(c) = s.scene.node(id).unwrap().shape else {
            panic!("expected circle");
        };
        assert!((c.center.x - before.x).abs() > 1e-9);
    }
}
