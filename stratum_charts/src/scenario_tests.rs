// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios across the figure, layer and surface layers.

use kurbo::Point;
use peniko::Brush;
use peniko::color::palette::css;
use stratum_core::{MountRegistry, Shape};

use crate::config::{FadeSpec, LayerConfig, VariantKind};
use crate::data::DataVector;
use crate::figure::Figure;

fn figure(id: &str, width: f64, height: f64) -> Figure {
    let mut reg = MountRegistry::new();
    reg.register_mount(id);
    Figure::create(id, width, height, &mut reg).unwrap()
}

#[test]
fn bar_chart_from_scratch_reserves_margins_and_draws_every_bar() {
    let mut fig = figure("a", 300.0, 150.0);
    fig.add_layer(
        LayerConfig::new(
            "bars",
            VariantKind::Bar,
            vec![214.0, 45.0, 134.0, 270.0, 157.0],
        )
        .with_animation(false),
    )
    .unwrap();
    fig.render_all().unwrap();

    let layer = fig.layer("bars").unwrap();
    assert_eq!(layer.shape_nodes().len(), 5);
    assert!(layer.safe().margin.top > 0.0);
    assert!(layer.safe().margin.left > 0.0);

    let surface = layer.surface();
    let surface = surface.borrow();
    let heights: Vec<f64> = layer
        .shape_nodes()
        .iter()
        .map(|&id| {
            let Shape::Rect(r) = surface.scene.node(id).unwrap().shape else {
                panic!("expected rect");
            };
            r.height()
        })
        .collect();
    // Heights order like the values: 270 tallest, 45 shortest.
    assert!(heights[3] > heights[0]);
    assert!(heights[0] > heights[1]);
    assert!(heights[2] > heights[1]);
}

#[test]
fn line_update_replaces_every_datum() {
    let mut fig = figure("c", 300.0, 150.0);
    fig.add_layer(
        LayerConfig::new("l", VariantKind::Line, vec![1.0, 2.0, 3.0])
            .with_column(vec!["adventure", "beginning", "city"])
            .with_animation(false),
    )
    .unwrap();
    fig.render_all().unwrap();

    fig.update_data("l", vec![10.0, 20.0, 3_000_000.0]).unwrap();
    fig.surface().borrow_mut().scene.settle();

    let layer = fig.layer("l").unwrap();
    let DataVector::Scalars(values) = layer.data() else {
        panic!("expected scalars");
    };
    assert!(values.iter().all(|&v| v >= 10.0));

    // The rebuilt labels show the new values, and no old value survives.
    let labels = layer.label_array();
    assert!(labels.iter().any(|l| l.contains("3000000")));
    assert!(labels.iter().all(|l| !l.ends_with(", 1")));

    // Rendered markers sit at the new scaled positions: the largest value
    // maps to the topmost marker.
    let surface = layer.surface();
    let surface = surface.borrow();
    let marker_y: Vec<f64> = surface
        .scene
        .nodes()
        .filter(|(_, n)| n.elem_id.contains("_plot_"))
        .map(|(_, n)| match &n.shape {
            Shape::Circle(c) => c.center.y,
            other => panic!("expected circle, got {other:?}"),
        })
        .collect();
    assert_eq!(marker_y.len(), 3);
    assert!(marker_y[2] < marker_y[0]);
    assert!(marker_y[2] < marker_y[1]);
}

#[test]
fn hover_accent_fades_in_and_reverts() {
    let mut fig = figure("h", 300.0, 150.0);
    fig.add_layer(
        LayerConfig::new("bars", VariantKind::Bar, vec![10.0, 20.0])
            .with_animation(false)
            .with_fade(FadeSpec::accent(css::ORANGE)),
    )
    .unwrap();
    fig.render_all().unwrap();

    let (bar, bar_center) = {
        let layer = fig.layer("bars").unwrap();
        let id = layer.shape_nodes()[0];
        let surface = layer.surface();
        let surface = surface.borrow();
        let Shape::Rect(r) = surface.scene.node(id).unwrap().shape else {
            panic!("expected rect");
        };
        (id, Point::new((r.x0 + r.x1) / 2.0, (r.y0 + r.y1) / 2.0))
    };

    let handle = fig.surface();
    {
        let mut surface = handle.borrow_mut();
        surface.pointer_moved(bar_center);
        surface.scene.settle();
        let Brush::Solid(fill) = surface.scene.node(bar).unwrap().fill else {
            panic!("expected solid fill");
        };
        assert_eq!(fill.to_rgba8(), css::ORANGE.to_rgba8());
    }
    {
        let mut surface = handle.borrow_mut();
        surface.pointer_moved(Point::new(1.0, 1.0));
        surface.scene.settle();
        let Brush::Solid(fill) = surface.scene.node(bar).unwrap().fill else {
            panic!("expected solid fill");
        };
        // Back to the default green fill.
        assert_eq!(fill.to_rgba8(), css::GREEN.to_rgba8());
    }
}

#[test]
fn hover_reveals_the_label_bubble() {
    let mut fig = figure("lbl", 300.0, 150.0);
    fig.add_layer(
        LayerConfig::new("bars", VariantKind::Bar, vec![10.0, 20.0]).with_animation(false),
    )
    .unwrap();
    fig.render_all().unwrap();

    let (hit_center, text_node) = {
        let layer = fig.layer("bars").unwrap();
        let surface = layer.surface();
        let surface = surface.borrow();
        let Shape::Rect(r) = surface
            .scene
            .node(layer.collision_nodes()[1])
            .unwrap()
            .shape
        else {
            panic!("expected rect");
        };
        (
            Point::new((r.x0 + r.x1) / 2.0, (r.y0 + r.y1) / 2.0),
            layer.label_nodes()[1].1,
        )
    };

    let handle = fig.surface();
    let mut surface = handle.borrow_mut();
    // Labels start invisible.
    let Brush::Solid(before) = surface.scene.node(text_node).unwrap().fill else {
        panic!("expected solid fill");
    };
    assert_eq!(before.to_rgba8().a, 0);

    surface.pointer_moved(hit_center);
    surface.scene.settle();
    let Brush::Solid(after) = surface.scene.node(text_node).unwrap().fill else {
        panic!("expected solid fill");
    };
    assert_eq!(after.to_rgba8(), css::BLACK.to_rgba8());
}

#[test]
fn racing_updates_land_on_the_last_write() {
    let mut fig = figure("r", 300.0, 150.0);
    fig.add_layer(
        LayerConfig::new("bars", VariantKind::Bar, vec![10.0, 20.0]).with_animation(false),
    )
    .unwrap();
    fig.render_all().unwrap();

    // Two updates in flight; the second must win once everything settles.
    fig.update_data("bars", vec![100.0, 20.0]).unwrap();
    fig.update_data("bars", vec![50.0, 20.0]).unwrap();
    fig.surface().borrow_mut().scene.settle();

    let layer = fig.layer("bars").unwrap();
    let surface = layer.surface();
    let surface = surface.borrow();
    let Shape::Rect(r) = surface.scene.node(layer.shape_nodes()[0]).unwrap().shape else {
        panic!("expected rect");
    };
    let scales = layer.scales().unwrap();
    let expected_top = scales.y.map(50.0) + layer.margin().top;
    assert!((r.y0 - expected_top).abs() < 1e-6);
}
