// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG dump utilities for `stratum_charts_demo`.

use peniko::Brush;
use stratum_core::{Shape, Surface, TextAnchor};

pub(crate) fn to_svg_string(surface: &Surface) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" width="{}" height="{}">"#,
        surface.id, surface.width, surface.height
    ));
    out.push('\n');

    for (_, node) in surface.scene.nodes() {
        match &node.shape {
            Shape::Rect(r) => {
                out.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                    r.x0,
                    r.y0,
                    r.width(),
                    r.height(),
                ));
                write_paint_attr(&mut out, "fill", &node.fill);
                write_stroke(&mut out, node.stroke_width, &node.stroke);
                out.push_str("/>\n");
            }
            Shape::Circle(c) => {
                out.push_str(&format!(
                    r#"<circle cx="{}" cy="{}" r="{}""#,
                    c.center.x, c.center.y, c.radius
                ));
                write_paint_attr(&mut out, "fill", &node.fill);
                write_stroke(&mut out, node.stroke_width, &node.stroke);
                out.push_str("/>\n");
            }
            Shape::Path(p) => {
                out.push_str(&format!(r#"<path d="{}""#, p.to_svg()));
                write_paint_attr(&mut out, "fill", &node.fill);
                write_stroke(&mut out, node.stroke_width, &node.stroke);
                out.push_str("/>\n");
            }
            Shape::Text(t) => {
                out.push_str(&format!(
                    r#"<text x="{}" y="{}" font-size="{}""#,
                    t.pos.x, t.pos.y, t.font_size
                ));
                out.push_str(match t.anchor {
                    TextAnchor::Start => r#" text-anchor="start""#,
                    TextAnchor::Middle => r#" text-anchor="middle""#,
                    TextAnchor::End => r#" text-anchor="end""#,
                });
                if t.angle != 0.0 {
                    out.push_str(&format!(
                        r#" transform="rotate({} {} {})""#,
                        t.angle, t.pos.x, t.pos.y
                    ));
                }
                write_paint_attr(&mut out, "fill", &node.fill);
                out.push('>');
                out.push_str(&escape_xml(&t.content));
                out.push_str("</text>\n");
            }
        }
    }

    out.push_str("</svg>\n");
    out
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            if rgba.a == 0 {
                return ("none".to_string(), None);
            }
            let paint = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (paint, opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    out.push_str(&format!(r#" {name}="{value}""#));
    if let Some(o) = opacity {
        out.push_str(&format!(r#" {name}-opacity="{o}""#));
    }
}

fn write_stroke(out: &mut String, width: f64, brush: &Brush) {
    if width > 0.0 {
        write_paint_attr(out, "stroke", brush);
        out.push_str(&format!(r#" stroke-width="{width}""#));
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
