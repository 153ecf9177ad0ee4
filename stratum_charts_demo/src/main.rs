// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart demos for `stratum_charts`: renders a few figures headlessly and
//! writes them out as SVG files.

mod svg;

use peniko::Color;
use peniko::color::palette::css;
use stratum_charts::{
    AxisSides, ColorTheme, FadeSpec, Figure, LayerConfig, MarginSpec, Paint, PieConfig, RelSpec,
    TickOptions, TicksSpec, VariantKind,
};
use stratum_core::MountRegistry;

fn main() {
    let mut registry = MountRegistry::new();
    registry.register_mount("bars");
    registry.register_mount("trend");
    registry.register_mount("portions");

    write_figure(bar_demo(&mut registry), "stratum_bars.svg");
    write_figure(related_lines_demo(&mut registry), "stratum_trend.svg");
    write_figure(pie_demo(&mut registry), "stratum_portions.svg");
}

fn write_figure(figure: Figure, file: &str) {
    let handle = figure.surface();
    // Headless: fast-forward entry animations before dumping.
    handle.borrow_mut().scene.settle();
    let markup = svg::to_svg_string(&handle.borrow());
    std::fs::write(file, markup).expect("write svg file");
    println!("wrote {file}");
}

fn bar_demo(registry: &mut MountRegistry) -> Figure {
    let mut figure = Figure::create("bars", 420.0, 260.0, registry).expect("create figure");
    figure
        .add_layer(
            LayerConfig::new(
                "revenue",
                VariantKind::Bar,
                vec![214.0, 45.0, 134.0, 270.0, 157.0],
            )
            .with_column(vec!["mon", "tue", "wed", "thu", "fri"])
            .with_margin(MarginSpec::map(20.0, 20.0, 0.0))
            .with_axes(AxisSides::bottom_left())
            .with_ticks(TicksSpec {
                y: TickOptions {
                    inner: true,
                    values: vec![50.0, 100.0, 150.0, 200.0, 250.0],
                },
                ..TicksSpec::default()
            })
            .with_color(ColorTheme {
                fill: Paint::PerDatum(std::rc::Rc::new(|d, _| {
                    Color::from_rgba8((d * 0.8) as u8, 90, (220.0 - d * 0.5) as u8, 255)
                })),
                ..ColorTheme::default()
            })
            .with_fade(FadeSpec::accent(css::ORANGE)),
        )
        .expect("add bar layer");
    figure.render_all().expect("render bars");
    figure
}

fn related_lines_demo(registry: &mut MountRegistry) -> Figure {
    let mut figure = Figure::create("trend", 420.0, 260.0, registry).expect("create figure");
    figure
        .add_layers(vec![
            LayerConfig::new("actual", VariantKind::Line, vec![12.0, 19.0, 31.0, 27.0, 44.0])
                .with_column(vec!["q1", "q2", "q3", "q4", "q5"])
                .with_axes(AxisSides::bottom_left())
                .with_smooth(true)
                .with_rel(RelSpec::Partner("budget".into())),
            LayerConfig::new("budget", VariantKind::Area, vec![15.0, 18.0, 25.0, 30.0, 35.0])
                .with_column(vec!["q1", "q2", "q3", "q4", "q5"])
                .with_color(ColorTheme {
                    fill: Paint::Solid(Color::from_rgba8(120, 160, 220, 90)),
                    stroke: Paint::Solid(css::STEEL_BLUE),
                    ..ColorTheme::default()
                }),
        ])
        .expect("add related layers");
    figure.render_all().expect("render trend");
    // Simulate a live refresh: the line animates to the new values.
    figure
        .update_data("actual", vec![14.0, 22.0, 28.0, 35.0, 41.0])
        .expect("update data");
    figure
}

fn pie_demo(registry: &mut MountRegistry) -> Figure {
    let mut figure = Figure::create("portions", 320.0, 320.0, registry).expect("create figure");
    figure
        .add_layer(
            LayerConfig::new(
                "p62",
                VariantKind::Pie,
                vec![21.0, 12.0, 11.0, 27.0, 10.0, 9.0, 10.0, 21.0, 13.0],
            )
            .with_column(vec![
                "liberty", "power", "wise", "humor", "commune", "unity", "passion", "thought",
                "other",
            ])
            .with_margin(MarginSpec::Uniform(30.0))
            .with_pie(PieConfig {
                radius: Some(110.0),
                inner_radius: Some(60.0),
                ..PieConfig::new()
            })
            .with_animation(false),
        )
        .expect("add pie layer");
    figure.render_all().expect("render pie");
    figure
}
