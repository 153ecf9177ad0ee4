// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar rendering.
//!
//! One rectangle per datum on a band x scale. Bars double as their own
//! hit-test shapes, so no separate collision elements are created.

use kurbo::Rect;
use peniko::Brush;
use stratum_core::{AttrTarget, Node, Shape, SurfaceHandle, Transition};

use crate::data::DataVector;
use crate::error::ChartError;
use crate::layer::{ENTRY_DELAY_MS, ENTRY_MS, Layer, XPos};

/// Bars animate updates a little slower than point-like shapes.
const BAR_UPDATE_MS: f64 = 500.0;

impl Layer {
    fn bar_rects(&self) -> Result<Vec<Rect>, ChartError> {
        let ds = self.data_scales()?;
        let XPos::Band { origin, bandwidth } = ds.x else {
            return Err(ChartError::ScaleNotReady(self.id.clone()));
        };
        let DataVector::Scalars(values) = &self.data else {
            return Err(ChartError::NotOneDimensional);
        };
        let bottom = self.area.y + self.margin.top;
        Ok(values
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let x = origin + bandwidth * i as f64;
                let top = (ds.y.map(d) + self.margin.top).min(bottom);
                Rect::new(x, top, x + bandwidth, bottom)
            })
            .collect())
    }

    pub(crate) fn render_bar(&mut self) -> Result<(), ChartError> {
        self.render_axes()?;
        let rects = self.bar_rects()?;
        let DataVector::Scalars(values) = self.data.clone() else {
            return Err(ChartError::NotOneDimensional);
        };
        let bottom = self.area.y + self.margin.top;
        let animated = self.animated;

        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.el.shapes.clear();
        for (i, rect) in rects.iter().enumerate() {
            let fill = self.color.fill.resolve(values[i], i);
            let stroke = self.color.stroke.resolve(values[i], i);
            let id = if animated {
                // Bars grow out of the baseline and fade their fill in.
                let seed = Rect::new(rect.x0, bottom, rect.x1, bottom);
                let node = Node::new(self.elem_id("rect", i), Shape::Rect(seed))
                    .with_class("st-bar")
                    .with_stroke(stroke, 1.0)
                    .with_pointer_events();
                let id = surface.scene.insert(node);
                surface.scene.schedule(Transition::new(
                    id,
                    ENTRY_DELAY_MS,
                    ENTRY_MS,
                    vec![
                        AttrTarget::Shape(Shape::Rect(*rect)),
                        AttrTarget::Fill(Brush::Solid(fill)),
                    ],
                ));
                id
            } else {
                let node = Node::new(self.elem_id("rect", i), Shape::Rect(*rect))
                    .with_class("st-bar")
                    .with_fill(fill)
                    .with_stroke(stroke, 1.0)
                    .with_pointer_events();
                surface.scene.insert(node)
            };
            self.el.shapes.push(id);
        }
        // Bars are their own hit-test shapes.
        self.el.collision = self.el.shapes.clone();
        Ok(())
    }

    pub(crate) fn update_bar(&mut self, data: DataVector) -> Result<(), ChartError> {
        self.update_data_core(data)?;
        self.auto_scale()?;
        let rects = self.bar_rects()?;
        let DataVector::Scalars(values) = self.data.clone() else {
            return Err(ChartError::NotOneDimensional);
        };

        let svg = SurfaceHandle::clone(&self.svg);
        {
            let mut surface = svg.borrow_mut();
            for (i, (&id, rect)) in self.el.shapes.iter().zip(rects.iter()).enumerate() {
                let fill = self.color.fill.resolve(values[i], i);
                surface.scene.schedule(Transition::new(
                    id,
                    0.0,
                    BAR_UPDATE_MS,
                    vec![
                        AttrTarget::Shape(Shape::Rect(*rect)),
                        AttrTarget::Fill(Brush::Solid(fill)),
                    ],
                ));
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
    use crate::config::{LayerConfig, SafeSpec, VariantKind};

    fn bar_layer(data: Vec<f64>, animated: bool) -> Layer {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let conf = LayerConfig::new("bars", VariantKind::Bar, data)
            .with_animation(animated)
            .with_surface(SurfaceSpec::Mount {
                target: "chart".into(),
                width: 300.0,
                height: 150.0,
            });
        let mut layer = Layer::new(conf, &mut reg).unwrap();
        layer.auto_scale().unwrap();
        layer
    }

    fn rect_of(layer: &Layer, i: usize) -> Rect {
        let surface = layer.surface();
        let surface = surface.borrow();
        let Shape::Rect(r) = surface.scene.node(layer.shape_nodes()[i]).unwrap().shape else {
            panic!("expected rect shape");
        };
        r
    }

    #[test]
    fn render_produces_one_rect_per_datum_with_proportional_heights() {
        let mut layer = bar_layer(vec![214.0, 45.0, 134.0, 270.0, 157.0], false);
        layer.render().unwrap();
        assert_eq!(layer.shape_nodes().len(), 5);
        // Safe margins reserve space above and to the left.
        assert!(layer.safe().margin.top > 0.0);
        assert!(layer.safe().margin.left > 0.0);
        // Taller value, taller bar.
        let h45 = rect_of(&layer, 1).height();
        let h270 = rect_of(&layer, 3).height();
        assert!(h270 > h45);
    }

    #[test]
    fn animated_bars_start_at_the_baseline_and_settle_to_full_height() {
        let mut layer = bar_layer(vec![10.0, 20.0], true);
        layer.render().unwrap();
        assert!((rect_of(&layer, 1).height() - 0.0).abs() < 1e-9);
        layer.surface().borrow_mut().scene.settle();
        assert!(rect_of(&layer, 1).height() > 0.0);
    }

    #[test]
    fn update_transitions_bars_to_the_new_values() {
        let mut layer = bar_layer(vec![10.0, 20.0, 30.0], false);
        layer.render().unwrap();
        let before = rect_of(&layer, 0).height();
        layer.update_data(vec![30.0, 20.0, 10.0]).unwrap();
        layer.surface().borrow_mut().scene.settle();
        let after = rect_of(&layer, 0).height();
        assert!(after > before);
    }

    #[test]
    fn disabled_fsr_keeps_margins_at_zero() {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let conf = LayerConfig::new("bars", VariantKind::Bar, vec![1.0, 2.0])
            .with_safe(SafeSpec::Disabled)
            .with_surface(SurfaceSpec::Mount {
                target: "chart".into(),
                width: 300.0,
                height: 150.0,
            });
        let layer = Layer::new(conf, &mut reg).unwrap();
        assert!((layer.safe().margin.top - 0.0).abs() < 1e-9);
        assert!((layer.safe().range - 0.0).abs() < 1e-9);
    }
}
