// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geographic choropleths.
//!
//! A geo layer joins a scalar series to polygon features by feature id (the
//! layer's column holds the ids) and fills each projected polygon from the
//! joined datum. Shape documents come from one or more sources: inline
//! documents render synchronously during [`Layer::render`]; URI sources are
//! recorded as pending and render whenever their fetch resolves, in
//! whatever order responses arrive. A failed fetch is logged and skipped —
//! the other sources are unaffected, and nothing is retried or cancelled.
//!
//! Two interchange formats are understood: GeoJSON feature collections and
//! a TopoJSON subset (quantized or unquantized arcs, polygon geometries).

use hashbrown::HashMap;
use kurbo::{BezPath, Point};
use peniko::Brush;
use serde_json::Value;
use stratum_core::{AttrTarget, Node, NodeId, Shape, SurfaceHandle, Transition};
use thiserror::Error;

use crate::config::{GeoConfig, LabelOptions};
use crate::data::{Column, DataVector, format_datum};
use crate::error::ChartError;
use crate::layer::{Layer, UPDATE_MS, Variant};

/// Errors from fetching or parsing a shape source.
///
/// These are *not* [`ChartError`]s: they surface through the per-source
/// resolution callbacks and are non-fatal to the layer.
#[derive(Debug, Error)]
pub enum ShapeSourceError {
    /// The document was not valid JSON.
    #[error("failed to parse shape document: {0}")]
    Parse(String),
    /// The document was JSON but not a supported geographic format.
    #[error("unsupported shape document format")]
    UnsupportedFormat,
    /// The fetch itself failed (network, filesystem, ...).
    #[error("failed to fetch shape source: {0}")]
    Fetch(String),
}

/// Fetches shape documents for URI sources.
///
/// The core never talks to the network itself; hosts implement this (or
/// call [`Layer::resolve_source`] directly) and decide retry policy.
pub trait ShapeFetcher {
    /// Fetches and parses the document at `uri`.
    fn fetch(&mut self, uri: &str) -> Result<ShapeDoc, ShapeSourceError>;
}

/// One shape source: an already-parsed document or a URI to fetch.
#[derive(Clone, Debug)]
pub enum ShapeSource {
    /// An inline document, rendered synchronously.
    Inline(ShapeDoc),
    /// A document to fetch; rendered when the fetch resolves.
    Uri(String),
}

/// A parsed shape document.
#[derive(Clone, Debug, Default)]
pub struct ShapeDoc {
    /// The polygon features of the document.
    pub features: Vec<ShapeFeature>,
}

/// One polygon feature.
#[derive(Clone, Debug)]
pub struct ShapeFeature {
    /// Feature id used to join against the layer's column.
    pub id: Option<String>,
    /// Free-form feature properties.
    pub properties: serde_json::Map<String, Value>,
    /// Polygon rings in `[longitude, latitude]` coordinates.
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl ShapeDoc {
    /// Parses a document from JSON text.
    pub fn parse(text: &str) -> Result<Self, ShapeSourceError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ShapeSourceError::Parse(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Parses a document from a JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ShapeSourceError> {
        match value.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => {
                let features = value
                    .get("features")
                    .and_then(Value::as_array)
                    .ok_or(ShapeSourceError::UnsupportedFormat)?
                    .iter()
                    .map(parse_feature)
                    .collect();
                Ok(Self { features })
            }
            Some("Feature") => Ok(Self {
                features: vec![parse_feature(value)],
            }),
            Some("Topology") => parse_topology(value),
            _ => Err(ShapeSourceError::UnsupportedFormat),
        }
    }
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_feature(value: &Value) -> ShapeFeature {
    let properties = value
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let id = value
        .get("id")
        .and_then(value_to_id)
        .or_else(|| properties.get("id").and_then(value_to_id));
    let rings = value
        .get("geometry")
        .map(parse_geometry_rings)
        .unwrap_or_default();
    ShapeFeature {
        id,
        properties,
        rings,
    }
}

fn parse_position(value: &Value) -> Option<[f64; 2]> {
    let coords = value.as_array()?;
    Some([coords.first()?.as_f64()?, coords.get(1)?.as_f64()?])
}

fn parse_ring(value: &Value) -> Vec<[f64; 2]> {
    value
        .as_array()
        .map(|points| points.iter().filter_map(parse_position).collect())
        .unwrap_or_default()
}

fn parse_geometry_rings(geometry: &Value) -> Vec<Vec<[f64; 2]>> {
    let coordinates = geometry.get("coordinates");
    match (geometry.get("type").and_then(Value::as_str), coordinates) {
        (Some("Polygon"), Some(Value::Array(rings))) => rings.iter().map(parse_ring).collect(),
        (Some("MultiPolygon"), Some(Value::Array(polys))) => polys
            .iter()
            .filter_map(Value::as_array)
            .flat_map(|rings| rings.iter().map(parse_ring))
            .collect(),
        _ => Vec::new(),
    }
}

/// A TopoJSON quantization transform.
#[derive(Clone, Copy, Debug, serde::Deserialize)]
struct TopoTransform {
    scale: [f64; 2],
    translate: [f64; 2],
}

/// Decodes the TopoJSON subset: top-level arcs (optionally quantized via a
/// `transform`), polygon geometries referencing arcs by index.
fn parse_topology(value: &Value) -> Result<ShapeDoc, ShapeSourceError> {
    let transform: Option<TopoTransform> = value
        .get("transform")
        .and_then(|t| serde_json::from_value(t.clone()).ok());

    let arcs: Vec<Vec<[f64; 2]>> = value
        .get("arcs")
        .and_then(Value::as_array)
        .ok_or(ShapeSourceError::UnsupportedFormat)?
        .iter()
        .map(|arc| {
            let deltas: Vec<[f64; 2]> = parse_ring(arc);
            match transform {
                Some(t) => {
                    // Quantized arcs are delta-encoded.
                    let mut x = 0.0;
                    let mut y = 0.0;
                    deltas
                        .iter()
                        .map(|d| {
                            x += d[0];
                            y += d[1];
                            [
                                x * t.scale[0] + t.translate[0],
                                y * t.scale[1] + t.translate[1],
                            ]
                        })
                        .collect()
                }
                None => deltas,
            }
        })
        .collect();

    let mut features = Vec::new();
    let objects = value
        .get("objects")
        .and_then(Value::as_object)
        .ok_or(ShapeSourceError::UnsupportedFormat)?;
    for object in objects.values() {
        collect_topo_features(object, &arcs, &mut features);
    }
    Ok(ShapeDoc { features })
}

fn collect_topo_features(object: &Value, arcs: &[Vec<[f64; 2]>], out: &mut Vec<ShapeFeature>) {
    match object.get("type").and_then(Value::as_str) {
        Some("GeometryCollection") => {
            if let Some(geometries) = object.get("geometries").and_then(Value::as_array) {
                for g in geometries {
                    collect_topo_features(g, arcs, out);
                }
            }
        }
        Some("Polygon") | Some("MultiPolygon") => {
            let properties = object
                .get("properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let id = object
                .get("id")
                .and_then(value_to_id)
                .or_else(|| properties.get("id").and_then(value_to_id));
            let rings = topo_rings(object, arcs);
            out.push(ShapeFeature {
                id,
                properties,
                rings,
            });
        }
        _ => {}
    }
}

fn topo_rings(object: &Value, arcs: &[Vec<[f64; 2]>]) -> Vec<Vec<[f64; 2]>> {
    let Some(arc_lists) = object.get("arcs").and_then(Value::as_array) else {
        return Vec::new();
    };
    let ring_from_indices = |indices: &Value| -> Vec<[f64; 2]> {
        let mut ring: Vec<[f64; 2]> = Vec::new();
        for idx in indices.as_array().into_iter().flatten() {
            let Some(i) = idx.as_i64() else { continue };
            let (arc_index, reversed) = if i < 0 {
                ((-1 - i) as usize, true)
            } else {
                (i as usize, false)
            };
            let Some(arc) = arcs.get(arc_index) else {
                continue;
            };
            let mut points: Vec<[f64; 2]> = arc.clone();
            if reversed {
                points.reverse();
            }
            // Consecutive arcs share endpoints.
            let skip = usize::from(!ring.is_empty());
            ring.extend(points.into_iter().skip(skip));
        }
        ring
    };
    match object.get("type").and_then(Value::as_str) {
        Some("Polygon") => arc_lists.iter().map(ring_from_indices).collect(),
        Some("MultiPolygon") => arc_lists
            .iter()
            .filter_map(Value::as_array)
            .flat_map(|rings| rings.iter().map(ring_from_indices))
            .collect(),
        _ => Vec::new(),
    }
}

/// A Mercator-style projection centered on a location with a zoom factor.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Mercator {
    k: f64,
    translate: Point,
    center: Point,
}

impl Mercator {
    pub(crate) fn new(location: [f64; 2], zoom: f64) -> Self {
        Self {
            k: 1000.0 * zoom,
            translate: Point::new(200.0, 150.0),
            center: Point::new(
                location[0].to_radians(),
                mercator_y(location[1].to_radians()),
            ),
        }
    }

    pub(crate) fn project(&self, lon: f64, lat: f64) -> Point {
        let x = lon.to_radians();
        let y = mercator_y(lat.to_radians().clamp(-1.48, 1.48));
        Point::new(
            self.translate.x + self.k * (x - self.center.x),
            self.translate.y - self.k * (y - self.center.y),
        )
    }
}

fn mercator_y(lat: f64) -> f64 {
    (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln()
}

/// Variant state of a geo layer.
#[derive(Debug, Default)]
pub(crate) struct GeoState {
    pub sources: Vec<ShapeSource>,
    pub pending: Vec<String>,
    pub rendered: HashMap<String, NodeId>,
    /// Property-derived label fragment per feature, kept so labels can be
    /// rebuilt when the datum changes.
    pub label_props: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    pub label_prefix: String,
    pub label_properties: Vec<String>,
    pub location: [f64; 2],
    pub zoom: f64,
}

impl GeoState {
    pub(crate) fn from_config(
        conf: &GeoConfig,
        label: Option<&LabelOptions>,
    ) -> Result<Self, ChartError> {
        if conf.src.is_empty() {
            return Err(ChartError::MissingSource);
        }
        Ok(Self {
            sources: conf.src.clone(),
            label_prefix: label.map(|l| l.prefix.clone()).unwrap_or_default(),
            label_properties: label.map(|l| l.properties.clone()).unwrap_or_default(),
            location: conf.location,
            zoom: conf.zoom,
            ..Self::default()
        })
    }
}

impl Layer {
    fn geo_state(&self) -> Option<&GeoState> {
        match &self.variant {
            Variant::Geo(g) => Some(g),
            _ => None,
        }
    }

    fn geo_state_mut(&mut self) -> Option<&mut GeoState> {
        match &mut self.variant {
            Variant::Geo(g) => Some(g),
            _ => None,
        }
    }

    /// The sequence position of a feature id in the layer's column.
    fn geo_seq(&self, key: &str) -> Option<usize> {
        match self.column.as_ref()? {
            Column::Labels(labels) => labels.iter().position(|l| l == key),
            Column::Numbers(numbers) => {
                let needle: f64 = key.parse().ok()?;
                numbers.iter().position(|&n| n == needle)
            }
        }
    }

    /// The joined datum for a feature, or 0 for unmatched features.
    fn geo_datum(&self, key: &str) -> f64 {
        self.geo_seq(key)
            .and_then(|seq| match &self.data {
                DataVector::Scalars(v) => v.get(seq).copied(),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    pub(crate) fn render_geo(&mut self) -> Result<(), ChartError> {
        let Some(geo) = self.geo_state() else {
            return Ok(());
        };
        let sources = geo.sources.clone();
        for source in sources {
            match source {
                ShapeSource::Inline(doc) => self.render_shape_doc(&doc)?,
                ShapeSource::Uri(uri) => {
                    tracing::debug!(target: "stratum", layer = %self.id, %uri, "shape source pending fetch");
                    if let Some(geo) = self.geo_state_mut() {
                        geo.pending.push(uri);
                    }
                }
            }
        }
        Ok(())
    }

    /// URI sources whose fetch has not resolved yet.
    pub fn pending_sources(&self) -> &[String] {
        self.geo_state().map(|g| g.pending.as_slice()).unwrap_or(&[])
    }

    /// Feeds the result of one source fetch back into the layer.
    ///
    /// Successful documents render immediately; failures are logged and the
    /// source is dropped without affecting anything already rendered.
    pub fn resolve_source(
        &mut self,
        uri: &str,
        result: Result<ShapeDoc, ShapeSourceError>,
    ) -> Result<(), ChartError> {
        if let Some(geo) = self.geo_state_mut() {
            geo.pending.retain(|p| p != uri);
        }
        match result {
            Ok(doc) => self.render_shape_doc(&doc),
            Err(err) => {
                tracing::warn!(target: "stratum", layer = %self.id, %uri, %err, "shape source failed");
                Ok(())
            }
        }
    }

    /// Resolves every pending source through `fetcher`, in declaration
    /// order. Individual failures are non-fatal.
    pub fn resolve_pending(&mut self, fetcher: &mut dyn ShapeFetcher) -> Result<(), ChartError> {
        let pending = self
            .geo_state()
            .map(|g| g.pending.clone())
            .unwrap_or_default();
        for uri in pending {
            let result = fetcher.fetch(&uri);
            self.resolve_source(&uri, result)?;
        }
        Ok(())
    }

    /// The current display label for a rendered feature.
    pub fn feature_label(&self, key: &str) -> Option<String> {
        self.geo_state().and_then(|g| g.labels.get(key).cloned())
    }

    fn render_shape_doc(&mut self, doc: &ShapeDoc) -> Result<(), ChartError> {
        let Some(geo) = self.geo_state() else {
            return Ok(());
        };
        let projection = Mercator::new(geo.location, geo.zoom);
        let prefix = geo.label_prefix.clone();
        let wanted_props = geo.label_properties.clone();
        let animated = self.animated;

        struct Pending {
            key: String,
            path: BezPath,
            fill: peniko::Color,
            props: String,
            label: String,
        }
        let mut batch = Vec::new();
        for feature in &doc.features {
            let Some(key) = feature.id.clone() else {
                tracing::warn!(target: "stratum", layer = %self.id, "skipping feature without id");
                continue;
            };
            let mut path = BezPath::new();
            for ring in &feature.rings {
                for (i, pos) in ring.iter().enumerate() {
                    let p = projection.project(pos[0], pos[1]);
                    if i == 0 {
                        path.move_to(p);
                    } else {
                        path.line_to(p);
                    }
                }
                if !ring.is_empty() {
                    path.close_path();
                }
            }
            let datum = self.geo_datum(&key);
            let seq = self.geo_seq(&key).unwrap_or(0);
            let fill = self.color.fill.resolve(datum, seq);
            let props = wanted_props
                .iter()
                .filter_map(|name| feature.properties.get(name))
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" ");
            let label = geo_label(&prefix, &props, datum);
            batch.push(Pending {
                key,
                path,
                fill,
                props,
                label,
            });
        }

        let svg = SurfaceHandle::clone(&self.svg);
        let mut placed = Vec::new();
        {
            let mut surface = svg.borrow_mut();
            for p in batch {
                let elem_id = format!("{}_{}_geo_{}", self.surface_id, self.id, p.key);
                let node = Node::new(elem_id, Shape::Path(p.path))
                    .with_class("st-geo")
                    .with_pointer_events();
                let node = if animated {
                    node
                } else {
                    node.with_fill(p.fill)
                };
                let id = surface.scene.insert(node);
                if animated {
                    surface.scene.schedule(Transition::new(
                        id,
                        0.0,
                        UPDATE_MS,
                        vec![AttrTarget::Fill(Brush::Solid(p.fill))],
                    ));
                }
                placed.push((p.key, id, p.props, p.label));
            }
        }
        if let Some(geo) = self.geo_state_mut() {
            for (key, id, props, label) in &placed {
                geo.rendered.insert(key.clone(), *id);
                geo.label_props.insert(key.clone(), props.clone());
                geo.labels.insert(key.clone(), label.clone());
            }
        }
        for (_, id, ..) in placed {
            self.el.shapes.push(id);
        }
        Ok(())
    }

    pub(crate) fn update_geo(&mut self, data: DataVector) -> Result<(), ChartError> {
        self.update_data_core(data)?;
        let Some(geo) = self.geo_state() else {
            return Ok(());
        };
        let rendered: Vec<(String, NodeId)> = geo
            .rendered
            .iter()
            .map(|(k, &v)| (k.clone(), v))
            .collect();
        let prefix = geo.label_prefix.clone();

        let svg = SurfaceHandle::clone(&self.svg);
        let mut new_labels = Vec::new();
        {
            let mut surface = svg.borrow_mut();
            for (key, node) in &rendered {
                let datum = self.geo_datum(key);
                let seq = self.geo_seq(key).unwrap_or(0);
                let fill = self.color.fill.resolve(datum, seq);
                surface.scene.schedule(Transition::new(
                    *node,
                    0.0,
                    UPDATE_MS,
                    vec![AttrTarget::Fill(Brush::Solid(fill))],
                ));
                let props = self
                    .geo_state()
                    .and_then(|g| g.label_props.get(key).cloned())
                    .unwrap_or_default();
                new_labels.push((key.clone(), geo_label(&prefix, &props, datum)));
            }
        }
        if let Some(geo) = self.geo_state_mut() {
            for (key, label) in new_labels {
                geo.labels.insert(key, label);
            }
        }
        Ok(())
    }
}

fn geo_label(prefix: &str, props: &str, datum: f64) -> String {
    let mut label = String::new();
    label.push_str(prefix);
    if !props.is_empty() {
        label.push_str(props);
        label.push(' ');
    }
    label.push_str(&format_datum(datum));
    label
}

#[cfg(test)]
mod tests {
    use stratum_core::{MountRegistry, SurfaceSpec};

    use super::*;
    use crate::config::{LayerConfig, VariantKind};

    fn square_feature(id: &str, name: &str) -> Value {
        serde_json::json!({
            "type": "Feature",
            "id": id,
            "properties": { "name": name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[140.0, 35.0], [141.0, 35.0], [141.0, 36.0], [140.0, 36.0], [140.0, 35.0]]]
            }
        })
    }

    fn doc(ids: &[(&str, &str)]) -> ShapeDoc {
        let features: Vec<Value> = ids.iter().map(|(i, n)| square_feature(i, n)).collect();
        ShapeDoc::from_value(&serde_json::json!({
            "type": "FeatureCollection",
            "features": features,
        }))
        .unwrap()
    }

    fn geo_layer(sources: Vec<ShapeSource>) -> Layer {
        let mut reg = MountRegistry::new();
        reg.register_mount("map");
        let conf = LayerConfig::new("g", VariantKind::Geo, vec![100.0, 121.0, 95.0])
            .with_column(vec!["a", "b", "c"])
            .with_animation(false)
            .with_label(crate::config::LabelSpec::On(crate::config::LabelOptions {
                properties: vec!["name".into()],
                ..crate::config::LabelOptions::default()
            }))
            .with_geo(GeoConfig {
                src: sources,
                location: [140.5, 35.48],
                zoom: 8.0,
            })
            .with_surface(SurfaceSpec::Mount {
                target: "map".into(),
                width: 400.0,
                height: 300.0,
            });
        Layer::new(conf, &mut reg).unwrap()
    }

    #[test]
    fn geo_requires_a_source_and_a_column() {
        let mut reg = MountRegistry::new();
        reg.register_mount("map");
        let conf = LayerConfig::new("g", VariantKind::Geo, vec![1.0])
            .with_column(vec!["a"])
            .with_surface(SurfaceSpec::Mount {
                target: "map".into(),
                width: 400.0,
                height: 300.0,
            });
        assert!(matches!(
            Layer::new(conf, &mut reg),
            Err(ChartError::MissingSource)
        ));

        let conf = LayerConfig::new("g", VariantKind::Geo, vec![1.0])
            .with_geo(GeoConfig {
                src: vec![ShapeSource::Uri("x.geojson".into())],
                ..GeoConfig::default()
            })
            .with_surface(SurfaceSpec::Mount {
                target: "map".into(),
                width: 400.0,
                height: 300.0,
            });
        assert!(matches!(
            Layer::new(conf, &mut reg),
            Err(ChartError::MissingColumn)
        ));
    }

    #[test]
    fn inline_sources_render_synchronously() {
        let mut layer = geo_layer(vec![ShapeSource::Inline(doc(&[("a", "A"), ("b", "B")]))]);
        layer.render().unwrap();
        assert_eq!(layer.shape_nodes().len(), 2);
        assert!(layer.pending_sources().is_empty());
        assert_eq!(layer.feature_label("a").as_deref(), Some("A 100"));
    }

    #[test]
    fn uri_sources_wait_for_resolution_and_failures_are_non_fatal() {
        let mut layer = geo_layer(vec![
            ShapeSource::Uri("one.geojson".into()),
            ShapeSource::Uri("two.geojson".into()),
        ]);
        layer.render().unwrap();
        assert_eq!(layer.shape_nodes().len(), 0);
        assert_eq!(layer.pending_sources().len(), 2);

        layer
            .resolve_source("one.geojson", Ok(doc(&[("a", "A")])))
            .unwrap();
        assert_eq!(layer.shape_nodes().len(), 1);

        layer
            .resolve_source(
                "two.geojson",
                Err(ShapeSourceError::Fetch("connection refused".into())),
            )
            .unwrap();
        // The failed source is gone; the first one is untouched.
        assert!(layer.pending_sources().is_empty());
        assert_eq!(layer.shape_nodes().len(), 1);
    }

    #[test]
    fn update_recolors_features_and_rebuilds_labels() {
        let mut layer = geo_layer(vec![ShapeSource::Inline(doc(&[("a", "A")]))]);
        layer.render().unwrap();
        layer.update_data(vec![7.0, 121.0, 95.0]).unwrap();
        assert_eq!(layer.feature_label("a").as_deref(), Some("A 7"));
    }

    #[test]
    fn topojson_arcs_decode_with_quantization() {
        let topo = serde_json::json!({
            "type": "Topology",
            "transform": { "scale": [1.0, 1.0], "translate": [100.0, 30.0] },
            "objects": {
                "city": {
                    "type": "Polygon",
                    "id": "a",
                    "arcs": [[0]],
                }
            },
            "arcs": [[[0, 0], [1, 0], [0, 1], [-1, 0], [0, -1]]],
        });
        let doc = ShapeDoc::from_value(&topo).unwrap();
        assert_eq!(doc.features.len(), 1);
        let ring = &doc.features[0].rings[0];
        assert_eq!(ring.len(), 5);
        assert!((ring[0][0] - 100.0).abs() < 1e-9);
        assert!((ring[1][0] - 101.0).abs() < 1e-9);
    }

    #[test]
    fn unsupported_documents_are_rejected() {
        assert!(matches!(
            ShapeDoc::from_value(&serde_json::json!({"type": "LineDelivery"})),
            Err(ShapeSourceError::UnsupportedFormat)
        ));
        assert!(matches!(
            ShapeDoc::parse("not json"),
            Err(ShapeSourceError::Parse(_))
        ));
    }
}
