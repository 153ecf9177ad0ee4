// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bubble rendering: scatter markers whose radius comes from the z scale.
//!
//! Bubbles need three-dimensional data, either as `[x, y, z]` triples or a
//! numeric column paired with `[y, z]`-style tuples. The hit-test circles
//! track the bubble geometry exactly (a bubble is already big enough to
//! hover).

use kurbo::{Circle, Point};
use stratum_core::{AttrTarget, Node, Shape, SurfaceHandle, Transition};

use crate::data::DataVector;
use crate::error::ChartError;
use crate::layer::{ENTRY_DELAY_MS, ENTRY_MS, Layer, UPDATE_MS};

impl Layer {
    pub(crate) fn render_bubble(&mut self) -> Result<(), ChartError> {
        self.render_axes()?;
        let ds = self.data_scales()?;
        let pts = self.normalized_xy_data()?;
        let animated = self.animated;

        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.el.shapes.clear();
        self.el.collision.clear();
        for (i, p) in pts.iter().enumerate() {
            let center = Point::new(ds.x(p, i), ds.y(p));
            let r = ds.z(p);
            let fill = self.color.fill.resolve(p.y, i);
            let node = Node::new(
                self.elem_id("bubble", i),
                Shape::Circle(Circle::new(center, if animated { 0.0 } else { r })),
            )
            .with_class("st-bubble")
            .with_fill(fill)
            .with_stroke(fill, 1.0);
            let id = surface.scene.insert(node);
            if animated {
                surface.scene.schedule(Transition::new(
                    id,
                    ENTRY_DELAY_MS,
                    ENTRY_MS,
                    vec![AttrTarget::Shape(Shape::Circle(Circle::new(center, r)))],
                ));
            }
            self.el.shapes.push(id);

            let hit = Node::new(
                self.elem_id("collision", i),
                Shape::Circle(Circle::new(center, r)),
            )
            .with_class("st-collision")
            .with_pointer_events();
            self.el.collision.push(surface.scene.insert(hit));
        }
        Ok(())
    }

    pub(crate) fn update_bubble(&mut self, data: DataVector) -> Result<(), ChartError> {
        self.update_data_core(data)?;
        self.auto_scale()?;
        let ds = self.data_scales()?;
        let pts = self.normalized_xy_data()?;
        let svg = SurfaceHandle::clone(&self.svg);
        {
            let mut surface = svg.borrow_mut();
            for (i, p) in pts.iter().enumerate() {
                let circle = Circle::new(Point::new(ds.x(p, i), ds.y(p)), ds.z(p));
                for nodes in [&self.el.shapes, &self.el.collision] {
                    if let Some(&id) = nodes.get(i) {
                        surface.scene.schedule(Transition::new(
                            id,
                            0.0,
                            UPDATE_MS,
                            vec![AttrTarget::Shape(Shape::Circle(circle))],
                        ));
                    }
                }
            }
        }
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
    use crate::config::{FocusSpec, LayerConfig, VariantKind};

    fn bubble_layer(focus: FocusSpec) -> Layer {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let conf = LayerConfig::new(
            "b",
            VariantKind::Bubble,
            vec![[120.0, 23.0, 7.0], [315.0, 5.0, 3.0], [411.0, 6.0, 2.0]],
        )
        .with_focus(focus)
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
    fn bubble_radius_follows_the_z_scale() {
        let mut layer = bubble_layer(FocusSpec::Off);
        layer.render().unwrap();
        let surface = layer.surface();
        let surface = surface.borrow();
        let radius = |i: usize| {
            let Shape::Circle(c) = surface.scene.node(layer.shape_nodes()[i]).unwrap().shape
            else {
                panic!("expected circle");
            };
            c.radius
        };
        // z = 7 is the largest datum, so it gets the largest radius.
        assert!(radius(0) > radius(1));
        assert!(radius(1) > radius(2));
    }

    #[test]
    fn auto_focus_keeps_the_largest_bubble_inside_the_plot() {
        let mut layer = bubble_layer(FocusSpec::Auto);
        layer.render().unwrap();
        let scales = layer.scales().unwrap();
        let (x0, x1) = scales.x.as_linear().unwrap().range();
        let surface = layer.surface();
        let surface = surface.borrow();
        for &id in layer.shape_nodes() {
            let Shape::Circle(c) = surface.scene.node(id).unwrap().shape else {
                panic!("expected circle");
            };
            assert!(c.center.x - c.radius >= x0.min(x1) - 1e-6);
            assert!(c.center.x + c.radius <= x0.max(x1) + 1e-6);
        }
    }
}
