// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis rendering.
//!
//! Axes are generated straight from a layer's derived scales: a domain
//! line, tick marks (or grid-length "inner" ticks spanning the plot), and
//! tick label text. Which sides draw is controlled by the layer's `axe`
//! config; tick values can be overridden per axis.

use kurbo::{BezPath, Point};
use stratum_core::{Node, Shape, SurfaceHandle, TextAnchor, TextShape};

use crate::data::format_datum;
use crate::error::ChartError;
use crate::layer::{LabelState, Layer, Variant};
use crate::scale::XScale;

const TICK_LEN: f64 = 6.0;

impl Layer {
    /// Draws the configured axes, replacing any previously drawn ones.
    pub(crate) fn render_axes(&mut self) -> Result<(), ChartError> {
        if !self.axis.has_x() && !self.axis.has_y() {
            return Ok(());
        }
        if self.scales.is_none() {
            return Err(ChartError::ScaleNotReady(self.id.clone()));
        }

        let mut nodes = Vec::new();
        if self.axis.has_x() {
            self.build_axe_x(&mut nodes);
        }
        if self.axis.has_y() {
            self.build_axe_y(&mut nodes);
        }

        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        for old in self.el.axes.drain(..) {
            surface.scene.remove(old);
        }
        for node in nodes {
            self.el.axes.push(surface.scene.insert(node));
        }
        Ok(())
    }

    /// Tick positions and display labels along x.
    fn x_ticks(&self) -> Vec<(f64, String)> {
        let Some(scales) = self.scales.as_ref() else {
            return Vec::new();
        };
        match &scales.x {
            XScale::Band(band) => {
                let bw = band.bandwidth();
                band.labels()
                    .iter()
                    .enumerate()
                    .map(|(i, label)| (band.position(i) + bw / 2.0, label.clone()))
                    .collect()
            }
            XScale::Linear(linear) => {
                let values = if self.ticks.x.values.is_empty() {
                    linear.ticks(5)
                } else {
                    self.ticks.x.values.clone()
                };
                values
                    .into_iter()
                    .map(|v| (linear.map(v), format_datum(v)))
                    .collect()
            }
        }
    }

    fn build_axe_x(&self, nodes: &mut Vec<Node>) {
        let scales = self.scales.as_ref().expect("checked by render_axes");
        let y0 = self.area.y + self.margin.top;
        let on_top = self.axis.top;
        let (x_start, x_end) = match &scales.x {
            XScale::Band(b) => b.range(),
            XScale::Linear(l) => l.range(),
        };
        let rotate = match &self.label {
            LabelState::On(o) => o.rotate,
            LabelState::Off => false,
        };

        let mut domain = BezPath::new();
        domain.move_to(Point::new(x_start, y0));
        domain.line_to(Point::new(x_end, y0));
        nodes.push(
            Node::new(self.elem_id_single("axe_x_domain"), Shape::Path(domain))
                .with_class("st-axis st-axis-x")
                .with_stroke(self.color.axe, 1.0),
        );

        let tick_end = if self.ticks.x.inner {
            // Grid-length ticks span the plot up to the top safety margin.
            self.margin.top + self.safe.margin.top
        } else if on_top {
            y0 - TICK_LEN
        } else {
            y0 + TICK_LEN
        };
        for (i, (px, label)) in self.x_ticks().into_iter().enumerate() {
            let mut tick = BezPath::new();
            tick.move_to(Point::new(px, y0));
            tick.line_to(Point::new(px, tick_end));
            nodes.push(
                Node::new(self.elem_id("axe_x_tick", i), Shape::Path(tick))
                    .with_class("st-axis st-axis-x")
                    .with_stroke(self.color.axe, 1.0),
            );

            let text_y = if on_top {
                y0 - TICK_LEN - self.font.size * 0.4
            } else {
                y0 + TICK_LEN + self.font.size
            };
            let mut text = TextShape::new(Point::new(px, text_y), label, self.font.size);
            text.anchor = TextAnchor::Middle;
            if rotate {
                text.angle = 90.0;
            }
            nodes.push(
                Node::new(self.elem_id("axe_x_text", i), Shape::Text(text))
                    .with_class("st-axis st-axis-x")
                    .with_fill(self.color.axe_text),
            );
        }
    }

    /// Tick positions (in final pixels) and labels along y.
    fn y_ticks(&self) -> Vec<(f64, String)> {
        let Some(scales) = self.scales.as_ref() else {
            return Vec::new();
        };
        let values = if self.ticks.y.values.is_empty() {
            scales.y.ticks(5)
        } else {
            self.ticks.y.values.clone()
        };
        values
            .into_iter()
            .map(|v| (scales.y.map(v) + self.margin.top, format_datum(v)))
            .collect()
    }

    fn build_axe_y(&self, nodes: &mut Vec<Node>) {
        let scales = self.scales.as_ref().expect("checked by render_axes");
        let on_right = self.axis.right;
        let mut x0 = if on_right {
            self.area.x - self.margin.right - self.safe.margin.right
        } else {
            self.margin.left + self.safe.margin.left
        };
        // Band-scale layers nudge the axis so it hugs the first slot: bars
        // compensate the label gutter, areas sit inside the first band.
        if let XScale::Band(b) = &scales.x {
            match self.variant {
                Variant::Bar => x0 -= self.label_width() / 2.0,
                Variant::Area { .. } => x0 += b.bandwidth() / 2.5,
                _ => {}
            }
        }

        let (r0, r1) = scales.y.range();
        let mut domain = BezPath::new();
        domain.move_to(Point::new(x0, r0 + self.margin.top));
        domain.line_to(Point::new(x0, r1 + self.margin.top));
        nodes.push(
            Node::new(self.elem_id_single("axe_y_domain"), Shape::Path(domain))
                .with_class("st-axis st-axis-y")
                .with_stroke(self.color.axe, 1.0),
        );

        let tick_end = if self.ticks.y.inner {
            x0 + self.area.x
                - self.safe.margin.left
                - self.margin.right
                - self.safe.margin.right
        } else if on_right {
            x0 + TICK_LEN
        } else {
            x0 - TICK_LEN
        };
        for (i, (py, label)) in self.y_ticks().into_iter().enumerate() {
            let mut tick = BezPath::new();
            tick.move_to(Point::new(x0, py));
            tick.line_to(Point::new(tick_end, py));
            nodes.push(
                Node::new(self.elem_id("axe_y_tick", i), Shape::Path(tick))
                    .with_class("st-axis st-axis-y")
                    .with_stroke(self.color.axe, 1.0),
            );

            let (text_x, anchor) = if on_right {
                (x0 + TICK_LEN + 2.0, TextAnchor::Start)
            } else {
                (x0 - TICK_LEN - 2.0, TextAnchor::End)
            };
            let mut text = TextShape::new(
                Point::new(text_x, py + self.font.size * 0.35),
                label,
                self.font.size,
            );
            text.anchor = anchor;
            nodes.push(
                Node::new(self.elem_id("axe_y_text", i), Shape::Text(text))
                    .with_class("st-axis st-axis-y")
                    .with_fill(self.color.axe_text),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use stratum_core::{MountRegistry, SurfaceSpec};

    use super::*;
    use crate::config::{AxisSides, LayerConfig, TickOptions, TicksSpec, VariantKind};

    fn layer_with_axes(ticks: TicksSpec) -> Layer {
        let mut reg = MountRegistry::new();
        reg.register_mount("chart");
        let conf = LayerConfig::new("s", VariantKind::Bar, vec![10.0, 20.0, 30.0])
            .with_axes(AxisSides::bottom_left())
            .with_ticks(ticks)
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
    fn axes_render_domain_ticks_and_text() {
        let mut layer = layer_with_axes(TicksSpec::default());
        layer.render_axes().unwrap();
        assert!(!layer.el.axes.is_empty());
        let surface = layer.surface();
        let surface = surface.borrow();
        // Band x axis gets one tick and one label per category.
        let tick_count = surface
            .scene
            .nodes()
            .filter(|(_, n)| n.elem_id.contains("_axe_x_tick_"))
            .count();
        assert_eq!(tick_count, 3);
        assert!(surface
            .scene
            .nodes()
            .any(|(_, n)| n.elem_id.ends_with("_axe_y_domain")));
    }

    #[test]
    fn explicit_tick_values_override_automatic_ones() {
        let mut layer = layer_with_axes(TicksSpec {
            y: TickOptions {
                inner: false,
                values: vec![5.0, 15.0, 25.0],
            },
            ..TicksSpec::default()
        });
        layer.render_axes().unwrap();
        let surface = layer.surface();
        let surface = surface.borrow();
        let y_labels: Vec<String> = surface
            .scene
            .nodes()
            .filter(|(_, n)| n.elem_id.contains("_axe_y_text_"))
            .filter_map(|(_, n)| match &n.shape {
                Shape::Text(t) => Some(t.content.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(y_labels, vec!["5", "15", "25"]);
    }

    #[test]
    fn rerendering_axes_replaces_old_nodes() {
        let mut layer = layer_with_axes(TicksSpec::default());
        layer.render_axes().unwrap();
        let first = layer.el.axes.len();
        layer.render_axes().unwrap();
        assert_eq!(layer.el.axes.len(), first);
        let surface = layer.surface();
        let surface = surface.borrow();
        let axis_nodes = surface
            .scene
            .nodes()
            .filter(|(_, n)| n.class.contains("st-axis"))
            .count();
        assert_eq!(axis_nodes, first);
    }
}
