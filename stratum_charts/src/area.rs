// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Area rendering: a line filled down to the baseline.

use kurbo::BezPath;
use peniko::Color;
use stratum_core::{AttrTarget, Node, Shape, SurfaceHandle, Transition};

use crate::data::DataVector;
use crate::error::ChartError;
use crate::layer::{ENTRY_DELAY_MS, ENTRY_MS, Layer, UPDATE_MS, Variant};
use crate::line::{monotone_x_path, polyline};

impl Layer {
    fn area_path(&self) -> Result<BezPath, ChartError> {
        let coords = self.line_coords()?;
        let smooth = matches!(self.variant, Variant::Area { smooth: true });
        let mut path = if smooth {
            monotone_x_path(&coords)
        } else {
            polyline(&coords)
        };
        if let (Some(&(x_first, _)), Some(&(x_last, _))) = (coords.first(), coords.last()) {
            let baseline = self.area.y + self.margin.top;
            path.line_to((x_last, baseline));
            path.line_to((x_first, baseline));
            path.close_path();
        }
        Ok(path)
    }

    pub(crate) fn render_area(&mut self) -> Result<(), ChartError> {
        self.render_axes()?;
        let path = self.area_path()?;
        let first_y = self.y_source_values().first().copied().unwrap_or(0.0);
        let fill = self.color.fill.resolve(first_y, 0);
        let stroke = self.color.stroke.resolve(first_y, 0);
        let animated = self.animated;

        {
            let svg = SurfaceHandle::clone(&self.svg);
            let mut surface = svg.borrow_mut();
            let node = Node::new(self.elem_id_single("area"), Shape::Path(path))
                .with_class("st-area")
                .with_fill(if animated { Color::TRANSPARENT } else { fill })
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
                    vec![
                        AttrTarget::Fill(fill.into()),
                        AttrTarget::Stroke(stroke.into()),
                    ],
                ));
            }
            self.el.shapes = vec![id];
        }

        if self.data_scales()?.is_band() {
            self.set_collision_bar()
        } else {
            self.set_collision()
        }
    }

    pub(crate) fn update_area(&mut self, data: DataVector) -> Result<(), ChartError> {
        self.update_data_core(data)?;
        self.auto_scale()?;
        let path = self.area_path()?;
        let svg = SurfaceHandle::clone(&self.svg);
        {
            let mut surface = svg.borrow_mut();
            if let Some(&area) = self.el.shapes.first() {
                surface.scene.schedule(Transition::new(
                    area,
                    0.0,
                    UPDATE_MS,
                    vec![AttrTarget::Shape(Shape::Path(path))],
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
    use kurbo::Shape as _;
    use stratum_core::{MountRegistry, SurfaceSpec};

    use super::*;
    use crate::config::{LayerConfig, VariantKind};

    #[test]
    fn area_path_closes_down_to_the_baseline() {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let conf = LayerConfig::new("a", VariantKind::Area, vec![5.0, 9.0, 7.0])
            .with_column(vec!["x", "y", "z"])
            .with_animation(false)
            .with_surface(SurfaceSpec::Mount {
                target: "chart".into(),
                width: 300.0,
                height: 150.0,
            });
        let mut layer = Layer::new(conf, &mut reg).unwrap();
        layer.auto_scale().unwrap();
        layer.render().unwrap();

        let surface = layer.surface();
        let surface = surface.borrow();
        let Shape::Path(p) = &surface.scene.node(layer.shape_nodes()[0]).unwrap().shape else {
            panic!("expected path");
        };
        assert!(matches!(p.elements().last(), Some(kurbo::PathEl::ClosePath)));
        // The fill reaches the baseline.
        let baseline = layer.area().y + layer.margin().top;
        assert!((p.bounding_box().y1 - baseline).abs() < 1e-9);
    }
}
