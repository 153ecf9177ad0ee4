// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The figure coordinator.
//!
//! A [`Figure`] owns the drawing surface plus registries of datasets,
//! columns, relation groups and layers, and drives the batch lifecycle.
//! Adding layers runs three passes — construct every layer, unify every
//! relation group, then derive every layer's scales — because unification
//! must see every sibling's raw fail-safe numbers before any layer commits
//! to a final scale. Rendering runs two passes — draw every layer, then
//! attach labels and hover wiring — so that every hit-test shape exists
//! before any wiring begins.

use hashbrown::HashMap;
use indexmap::IndexMap;
use stratum_core::{SurfaceError, SurfaceHandle, SurfaceProvider, SurfaceSpec};

use crate::config::{LayerConfig, VariantKind};
use crate::data::{Column, DataVector, check_column_length};
use crate::error::ChartError;
use crate::geo::ShapeFetcher;
use crate::layer::Layer;
use crate::relation::{RelationTable, aggregate, apply};

/// A provider that only resolves explicit handles; figures hand their own
/// surface to every layer they construct.
struct HandleProvider;

impl SurfaceProvider for HandleProvider {
    fn resolve_or_create(&mut self, spec: &SurfaceSpec) -> Result<SurfaceHandle, SurfaceError> {
        match spec {
            SurfaceSpec::Handle(handle) => Ok(SurfaceHandle::clone(handle)),
            _ => Err(SurfaceError::Unresolvable),
        }
    }
}

/// A figure: one drawing surface and the layers drawn into it.
pub struct Figure {
    chart_id: String,
    width: f64,
    height: f64,
    svg: SurfaceHandle,
    dataset: HashMap<String, DataVector>,
    columns: HashMap<String, Column>,
    layers: IndexMap<String, Layer>,
    rel: RelationTable,
}

impl core::fmt::Debug for Figure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Figure")
            .field("chart_id", &self.chart_id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layers", &self.layers.len())
            .finish_non_exhaustive()
    }
}

impl Figure {
    /// Creates a figure with a surface resolved (usually created) at the
    /// mount point named by `chart_id`.
    pub fn create(
        chart_id: impl Into<String>,
        width: f64,
        height: f64,
        provider: &mut dyn SurfaceProvider,
    ) -> Result<Self, ChartError> {
        let chart_id = chart_id.into();
        let svg = provider.resolve_or_create(&SurfaceSpec::Mount {
            target: chart_id.clone(),
            width,
            height,
        })?;
        Ok(Self::with_surface(chart_id, svg))
    }

    /// Wraps an existing surface handle.
    pub fn with_surface(chart_id: impl Into<String>, svg: SurfaceHandle) -> Self {
        let (width, height) = {
            let s = svg.borrow();
            (s.width, s.height)
        };
        Self {
            chart_id: chart_id.into(),
            width,
            height,
            svg,
            dataset: HashMap::new(),
            columns: HashMap::new(),
            layers: IndexMap::new(),
            rel: RelationTable::new(),
        }
    }

    /// Surface width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Surface height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The figure's surface.
    pub fn surface(&self) -> SurfaceHandle {
        SurfaceHandle::clone(&self.svg)
    }

    /// Registers a config's dataset (and column) under its layer id.
    fn push_data(&mut self, fig: &LayerConfig) -> Result<(), ChartError> {
        if fig.id.is_empty() {
            return Err(ChartError::MissingId);
        }
        if fig.data.is_empty() {
            return Err(ChartError::EmptyData);
        }
        check_column_length(&fig.data, fig.column.as_ref())?;
        if let Some(column) = &fig.column {
            self.columns.insert(fig.id.clone(), column.clone());
        }
        self.dataset.insert(fig.id.clone(), fig.data.clone());
        Ok(())
    }

    /// Constructs one layer (without scaling) and registers it.
    fn push_layer(&mut self, mut fig: LayerConfig) -> Result<(), ChartError> {
        if self.layers.contains_key(&fig.id) {
            return Err(ChartError::DuplicateSeries(fig.id));
        }
        fig.svg = Some(SurfaceSpec::Handle(SurfaceHandle::clone(&self.svg)));
        let layer = Layer::new(fig, &mut HandleProvider)?;
        self.layers.insert(layer.id().to_owned(), layer);
        Ok(())
    }

    /// The layer registered under `series`.
    pub fn layer(&self, series: &str) -> Result<&Layer, ChartError> {
        self.layers
            .get(series)
            .ok_or_else(|| ChartError::NoSeries(series.to_owned()))
    }

    /// Mutable access to the layer registered under `series`.
    pub fn layer_mut(&mut self, series: &str) -> Result<&mut Layer, ChartError> {
        self.layers
            .get_mut(series)
            .ok_or_else(|| ChartError::NoSeries(series.to_owned()))
    }

    /// The full relation group containing `id`, if any.
    pub fn relation(&self, id: &str) -> Option<&[String]> {
        self.rel.get(id)
    }

    /// Unifies FSR parameters across every declared relation group.
    fn arrange_layers(&mut self) {
        for group in self.rel.groups().to_vec() {
            let members: Vec<String> = group
                .iter()
                .filter(|id| self.layers.contains_key(id.as_str()))
                .cloned()
                .collect();
            if members.len() < 2 {
                continue;
            }
            let Some(agg) =
                aggregate(members.iter().filter_map(|id| self.layers.get(id.as_str())))
            else {
                continue;
            };
            for id in &members {
                if let Some(layer) = self.layers.get_mut(id.as_str()) {
                    apply(&agg, layer);
                }
            }
        }
    }

    /// Adds one layer.
    pub fn add_layer(&mut self, fig: LayerConfig) -> Result<&mut Self, ChartError> {
        self.add_layers(vec![fig])
    }

    /// Adds a batch of layers.
    ///
    /// Runs construct-all → unify-all → scale-all: relation groups are
    /// built across the whole batch first, every layer is constructed
    /// (fail-safe region computed, scales deferred), groups are unified,
    /// and only then does every layer derive its final scales.
    pub fn add_layers(&mut self, figs: Vec<LayerConfig>) -> Result<&mut Self, ChartError> {
        if figs.is_empty() {
            return Err(ChartError::EmptyBatch);
        }
        tracing::debug!(target: "stratum", figure = %self.chart_id, batch = figs.len(), "adding layers");
        for fig in &figs {
            self.rel.declare(&fig.id, &fig.rel);
        }
        let ids: Vec<String> = figs.iter().map(|f| f.id.clone()).collect();
        for fig in figs {
            self.push_data(&fig)?;
            self.push_layer(fig)?;
        }
        self.arrange_layers();
        for id in &ids {
            if let Some(group) = self.rel.get(id).map(<[String]>::to_vec) {
                if let Some(layer) = self.layers.get_mut(id.as_str()) {
                    layer.rel = Some(group);
                }
            }
        }
        for (_, layer) in self.layers.iter_mut() {
            layer.auto_scale()?;
        }
        Ok(self)
    }

    /// Adds one or more bar layers (every config's variant is forced to
    /// bar).
    pub fn add_bars(&mut self, mut figs: Vec<LayerConfig>) -> Result<&mut Self, ChartError> {
        for fig in &mut figs {
            fig.kind = VariantKind::Bar;
        }
        self.add_layers(figs)
    }

    /// Renders every layer, then attaches labels and hover wiring.
    ///
    /// Two passes, so that the hit-test shapes hover wiring binds to exist
    /// for all layers before any wiring begins.
    pub fn render_all(&mut self) -> Result<(), ChartError> {
        for (_, layer) in self.layers.iter_mut() {
            layer.render()?;
        }
        for (_, layer) in self.layers.iter_mut() {
            if layer.scales().is_some() || layer.kind() == VariantKind::Pie {
                layer.set_label(true)?;
            }
            layer.set_transition()?;
        }
        Ok(())
    }

    /// Replaces the data of one layer and refreshes its visuals.
    pub fn update_data(
        &mut self,
        series: &str,
        data: impl Into<DataVector>,
    ) -> Result<(), ChartError> {
        let data = data.into();
        self.layer_mut(series)?.update_data(data.clone())?;
        self.dataset.insert(series.to_owned(), data);
        Ok(())
    }

    /// Resolves pending geo shape sources across all layers through
    /// `fetcher`. Individual source failures are logged, not raised.
    pub fn resolve_shape_sources(
        &mut self,
        fetcher: &mut dyn ShapeFetcher,
    ) -> Result<(), ChartError> {
        for (_, layer) in self.layers.iter_mut() {
            if layer.kind() == VariantKind::Geo {
                layer.resolve_pending(fetcher)?;
            }
        }
        Ok(())
    }
}
