// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative layered charts on a `stratum_core` surface.
//!
//! A chart is a set of **layers** over one surface, coordinated by a
//! [`Figure`]. Each layer owns a series (plus an optional category
//! column), derives its coordinate scales from the data shape, reserves
//! fail-safe margins so labels cannot clip, and renders styled, animated
//! vector shapes. Layers that declare a relation get their margins unified
//! so grouped plots align.
//!
//! ```
//! use stratum_charts::{Figure, LayerConfig, VariantKind};
//! use stratum_core::MountRegistry;
//!
//! let mut registry = MountRegistry::new();
//! registry.register_mount("sales");
//! let mut figure = Figure::create("sales", 300.0, 150.0, &mut registry).unwrap();
//! figure
//!     .add_layer(LayerConfig::new(
//!         "q1",
//!         VariantKind::Bar,
//!         vec![214.0, 45.0, 134.0, 270.0, 157.0],
//!     ))
//!     .unwrap();
//! figure.render_all().unwrap();
//! ```

mod area;
mod axis;
mod bar;
mod bubble;
mod config;
mod data;
mod error;
mod figure;
mod fsr;
mod geo;
mod label;
mod layer;
mod line;
mod pie;
mod plot;
mod relation;
mod scale;
#[cfg(test)]
mod scenario_tests;

pub use config::{
    Area, AreaSpec, AxisSides, ColorTheme, FadeActions, FadeSpec, FocusSpec, Font, GeoConfig,
    LabelOptions, LabelSpec, LayerConfig, Margin, MarginSpec, Paint, PieConfig, RelSpec,
    SafeAreaOverride, SafeMarginOverride, SafeOverride, SafeSpec, TickOptions, TicksSpec,
    VariantKind,
};
pub use data::{Column, DataVector, DatumPoint, extent, format_datum};
pub use error::ChartError;
pub use figure::Figure;
pub use fsr::{SafeArea, SafeMargin, SafeRegion};
pub use geo::{ShapeDoc, ShapeFeature, ShapeFetcher, ShapeSource, ShapeSourceError};
pub use label::{bubble_outline, bubble_text_pos};
pub use layer::Layer;
pub use pie::PieParams;
pub use relation::RelationTable;
pub use scale::{
    BandScale, LinearScale, ScaleInputs, ScaleSet, XScale, auto_focus_range, derive_band_y,
    derive_xyz,
};
