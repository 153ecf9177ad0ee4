// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer: configuration, lifecycle state, and the behavior every chart
//! variant shares.
//!
//! A layer moves through a fixed lifecycle: **constructed** (config
//! validated and normalized, fail-safe region computed, no scales yet) →
//! **scaled** ([`Layer::auto_scale`]) → **rendered** ([`Layer::render`],
//! which creates shape and hit-test nodes) → optionally **labeled**
//! ([`Layer::set_label`]) and **wired** ([`Layer::set_transition`]) →
//! **updated** any number of times ([`Layer::update_data`], which swaps
//! values in place, re-derives scales, and animates shapes to their new
//! coordinates).
//!
//! Concrete variants specialize scale selection and drawing; everything
//! else — normalization, labels, fail-safe margins, relation data, hover
//! wiring — lives here.

use kurbo::{Circle, Point, Rect};
use peniko::{Brush, Color};
use stratum_core::{
    AttrTarget, HoverAction, HoverBinding, Node, NodeId, Scene, Shape, SurfaceHandle,
    SurfaceProvider, TextAnchor, TextShape, Transition,
};

use crate::config::{
    Area, AxisSides, ColorTheme, FadeSpec, FocusSpec, Font, LabelOptions, LabelSpec, LayerConfig,
    Margin, RelSpec, SafeSpec, TicksSpec, VariantKind,
};
use crate::data::{Column, DataVector, DatumPoint, check_column_length, extent, format_datum};
use crate::error::ChartError;
use crate::fsr::SafeRegion;
use crate::geo::GeoState;
use crate::label::{bubble_outline, bubble_text_pos};
use crate::pie::PieParams;
use crate::scale::{
    LinearScale, ScaleInputs, ScaleSet, auto_focus_range, derive_band_y, derive_xyz,
};

/// Fade duration for hover accents and label reveals, in milliseconds.
pub(crate) const FADE_MS: f64 = 200.0;
/// Entry animation delay/duration.
pub(crate) const ENTRY_DELAY_MS: f64 = 250.0;
pub(crate) const ENTRY_MS: f64 = 850.0;
/// Default update transition duration.
pub(crate) const UPDATE_MS: f64 = 250.0;

/// Variant-specific state carried by a layer.
#[derive(Debug)]
pub(crate) enum Variant {
    Plain,
    Bar,
    Line { smooth: bool, plot: bool },
    Area { smooth: bool },
    Plot,
    Bubble,
    Pie(PieParams),
    Geo(GeoState),
}

/// Label lifecycle state.
#[derive(Debug)]
pub(crate) enum LabelState {
    Off,
    On(LabelOptions),
}

/// Handles to the scene nodes a layer has rendered.
#[derive(Debug, Default)]
pub(crate) struct Elements {
    /// Primary shapes: one per datum, or a single path for line/area.
    pub shapes: Vec<NodeId>,
    /// Point-marker overlay (line layers).
    pub plot: Vec<NodeId>,
    /// Invisible enlarged hit-test shapes.
    pub collision: Vec<NodeId>,
    /// Label nodes as `(bubble, text)` pairs, one per datum.
    pub labels: Vec<(NodeId, NodeId)>,
    /// Axis nodes (domain lines, ticks, tick text).
    pub axes: Vec<NodeId>,
}

/// Positioning closures over a derived scale set, in drawing coordinates.
///
/// Band x positions use the datum index (slot center); continuous x maps the
/// datum's x component. Y adds the layer's top margin so shapes can use the
/// result directly.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DataScales {
    pub x: XPos,
    pub y: LinearScale,
    pub y_offset: f64,
    pub z: Option<LinearScale>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum XPos {
    Band { origin: f64, bandwidth: f64 },
    Linear(LinearScale),
}

impl DataScales {
    pub(crate) fn x(&self, p: &DatumPoint, i: usize) -> f64 {
        match self.x {
            XPos::Band { origin, bandwidth } => {
                origin + bandwidth * i as f64 + bandwidth / 2.0
            }
            XPos::Linear(s) => s.map(p.x),
        }
    }

    pub(crate) fn y(&self, p: &DatumPoint) -> f64 {
        self.y.map(p.y) + self.y_offset
    }

    pub(crate) fn z(&self, p: &DatumPoint) -> f64 {
        let v = p.z.unwrap_or(0.0);
        match self.z {
            Some(s) => s.map(v),
            None => v,
        }
    }

    pub(crate) fn is_band(&self) -> bool {
        matches!(self.x, XPos::Band { .. })
    }
}

/// One chart layer.
pub struct Layer {
    pub(crate) id: String,
    pub(crate) variant: Variant,
    pub(crate) svg: SurfaceHandle,
    pub(crate) surface_id: String,
    pub(crate) font: Font,
    pub(crate) margin: Margin,
    pub(crate) area: Area,
    pub(crate) data: DataVector,
    pub(crate) column: Option<Column>,
    pub(crate) focus: FocusSpec,
    pub(crate) axis: AxisSides,
    pub(crate) ticks: TicksSpec,
    pub(crate) label: LabelState,
    pub(crate) color: ColorTheme,
    pub(crate) fade: FadeSpec,
    pub(crate) animated: bool,
    pub(crate) safe: SafeRegion,
    pub(crate) scales: Option<ScaleSet>,
    pub(crate) el: Elements,
    pub(crate) rel: Option<Vec<String>>,
}

impl core::fmt::Debug for Layer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("len", &self.data.len())
            .field("scaled", &self.scales.is_some())
            .field("rendered", &!self.el.shapes.is_empty())
            .finish_non_exhaustive()
    }
}

impl Layer {
    /// Validates and normalizes a configuration into a constructed layer.
    ///
    /// The layer is not scaled yet; call [`Layer::auto_scale`] (or let
    /// [`Layer::render`] do it) once any relation unification has run.
    pub fn new(
        conf: LayerConfig,
        provider: &mut dyn SurfaceProvider,
    ) -> Result<Self, ChartError> {
        if conf.id.is_empty() {
            return Err(ChartError::MissingId);
        }
        if conf.data.is_empty() {
            return Err(ChartError::EmptyData);
        }
        check_column_length(&conf.data, conf.column.as_ref())?;
        conf.focus.validate()?;

        let spec = conf
            .svg
            .as_ref()
            .ok_or(ChartError::Surface(stratum_core::SurfaceError::Unresolvable))?;
        let svg = provider.resolve_or_create(spec)?;
        let (surface_id, sw, sh) = {
            let s = svg.borrow();
            (s.id.clone(), s.width, s.height)
        };

        let margin = conf.margin.normalize()?;
        let area = conf.area.normalize(sw, sh);

        let y_values = if conf.data.is_nested() {
            conf.data.component(1)
        } else {
            conf.data.component(0)
        };
        let y_max = extent(y_values).map(|(_, max)| max).unwrap_or(0.0);
        let safe = match conf.safe {
            SafeSpec::Disabled => SafeRegion::disabled(area),
            SafeSpec::Override(ov) => SafeRegion::overridden(area, &ov),
            SafeSpec::Auto => SafeRegion::computed(conf.font.size, y_max, area, conf.axe.right),
        };

        let label_options = match &conf.label {
            LabelSpec::Default => Some(LabelOptions::default()),
            LabelSpec::Off => None,
            LabelSpec::On(o) => Some(o.clone()),
        };

        let variant = match conf.kind {
            VariantKind::Plain => Variant::Plain,
            VariantKind::Bar => Variant::Bar,
            VariantKind::Line => Variant::Line {
                smooth: conf.smooth,
                plot: conf.plot != Some(false),
            },
            VariantKind::Area => Variant::Area { smooth: conf.smooth },
            VariantKind::Plot => Variant::Plot,
            VariantKind::Bubble => Variant::Bubble,
            VariantKind::Pie => Variant::Pie(PieParams::from_config(&conf.pie, area)),
            VariantKind::Geo => {
                if conf.column.is_none() {
                    return Err(ChartError::MissingColumn);
                }
                Variant::Geo(GeoState::from_config(&conf.geo, label_options.as_ref())?)
            }
        };

        // Geo layers keep their label options inside the variant state and
        // never render the shared label bubbles.
        let label = if matches!(conf.kind, VariantKind::Geo) {
            LabelState::Off
        } else {
            match label_options {
                Some(o) => LabelState::On(o),
                None => LabelState::Off,
            }
        };

        Ok(Self {
            id: conf.id,
            variant,
            svg,
            surface_id,
            font: conf.font,
            margin,
            area,
            data: conf.data,
            column: conf.column,
            focus: conf.focus,
            axis: conf.axe,
            ticks: conf.ticks,
            label,
            color: conf.color,
            fade: conf.fade,
            animated: conf.animation,
            safe,
            scales: None,
            el: Elements::default(),
            rel: match conf.rel {
                RelSpec::None => None,
                RelSpec::Partner(p) => Some(vec![p]),
                RelSpec::Group(g) => Some(g),
            },
        })
    }

    /// The layer id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The chart variant.
    pub fn kind(&self) -> VariantKind {
        match &self.variant {
            Variant::Plain => VariantKind::Plain,
            Variant::Bar => VariantKind::Bar,
            Variant::Line { .. } => VariantKind::Line,
            Variant::Area { .. } => VariantKind::Area,
            Variant::Plot => VariantKind::Plot,
            Variant::Bubble => VariantKind::Bubble,
            Variant::Pie(_) => VariantKind::Pie,
            Variant::Geo(_) => VariantKind::Geo,
        }
    }

    /// Current data.
    pub fn data(&self) -> &DataVector {
        &self.data
    }

    /// Normalized outer margins.
    pub fn margin(&self) -> Margin {
        self.margin
    }

    /// Normalized drawing area.
    pub fn area(&self) -> Area {
        self.area
    }

    /// The fail-safe region.
    pub fn safe(&self) -> &SafeRegion {
        &self.safe
    }

    /// Derived scales, once [`Layer::auto_scale`] has run.
    pub fn scales(&self) -> Option<&ScaleSet> {
        self.scales.as_ref()
    }

    /// The full relation group this layer belongs to, if any.
    pub fn rel(&self) -> Option<&[String]> {
        self.rel.as_deref()
    }

    /// The surface this layer draws into.
    pub fn surface(&self) -> SurfaceHandle {
        SurfaceHandle::clone(&self.svg)
    }

    /// Rendered primary shape nodes.
    pub fn shape_nodes(&self) -> &[NodeId] {
        &self.el.shapes
    }

    /// Rendered hit-test nodes.
    pub fn collision_nodes(&self) -> &[NodeId] {
        &self.el.collision
    }

    /// Rendered label `(bubble, text)` node pairs.
    pub fn label_nodes(&self) -> &[(NodeId, NodeId)] {
        &self.el.labels
    }

    // ---- shape predicates ------------------------------------------------

    /// Whether each datum is a tuple.
    pub fn has_nested_data(&self) -> bool {
        self.data.is_nested()
    }

    /// Whether a category column is present.
    pub fn has_column(&self) -> bool {
        self.column.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Whether the column is present and numeric.
    pub fn has_number_column(&self) -> bool {
        self.column
            .as_ref()
            .is_some_and(|c| !c.is_empty() && c.is_numeric())
    }

    // ---- data canonicalization -------------------------------------------

    /// Canonicalizes the data into one `[x, y(, z)]` point per datum.
    ///
    /// Tuple data passes through. Scalar data zips with a numeric column,
    /// or synthesizes an index `0..N-1` as x for string columns and
    /// columnless layers.
    pub fn normalized_xy_data(&self) -> Result<Vec<DatumPoint>, ChartError> {
        match &self.data {
            DataVector::Pairs(v) => Ok(v
                .iter()
                .map(|d| DatumPoint {
                    x: d[0],
                    y: d[1],
                    z: None,
                })
                .collect()),
            DataVector::Triples(v) => Ok(v
                .iter()
                .map(|d| DatumPoint {
                    x: d[0],
                    y: d[1],
                    z: Some(d[2]),
                })
                .collect()),
            DataVector::Scalars(values) => {
                if let Some(column) = &self.column {
                    if column.is_empty() || column.len() > values.len() {
                        return Err(ChartError::ColumnLength {
                            column: column.len(),
                            data: values.len(),
                        });
                    }
                    if let Column::Numbers(keys) = column {
                        return Ok(keys
                            .iter()
                            .zip(values.iter())
                            .map(|(&x, &y)| DatumPoint { x, y, z: None })
                            .collect());
                    }
                }
                Ok(values
                    .iter()
                    .enumerate()
                    .map(|(i, &y)| DatumPoint {
                        x: i as f64,
                        y,
                        z: None,
                    })
                    .collect())
            }
        }
    }

    // ---- labels ----------------------------------------------------------

    /// One display string per datum: the column key (when present) joined
    /// with the datum components.
    pub fn label_array(&self) -> Vec<String> {
        let n = self.data.len();
        (0..n)
            .map(|i| {
                let datum = match &self.data {
                    DataVector::Scalars(v) => format_datum(v[i]),
                    DataVector::Pairs(v) => {
                        format!("{}, {}", format_datum(v[i][0]), format_datum(v[i][1]))
                    }
                    DataVector::Triples(v) => format!(
                        "{}, {}, {}",
                        format_datum(v[i][0]),
                        format_datum(v[i][1]),
                        format_datum(v[i][2])
                    ),
                };
                match &self.column {
                    Some(c) => format!("{}, {}", c.label_at(i), datum),
                    None => datum,
                }
            })
            .collect()
    }

    /// Character length of the longest label.
    pub fn label_max(&self) -> usize {
        self.label_array()
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Pixel width estimate of the widest label.
    pub fn label_width(&self) -> f64 {
        (self.label_max() as f64 + 2.0) * self.font.size / 2.0
    }

    // ---- scaling ---------------------------------------------------------

    pub(crate) fn x_source_values(&self) -> Result<Vec<f64>, ChartError> {
        if let Some(Column::Numbers(v)) = &self.column {
            return Ok(v.clone());
        }
        if self.data.is_nested() {
            return Ok(self.data.component(0));
        }
        Err(ChartError::NotMultiDimensional)
    }

    pub(crate) fn y_source_values(&self) -> Vec<f64> {
        if self.data.is_nested() {
            self.data.component(1)
        } else {
            self.data.component(0)
        }
    }

    /// Derives scales with the variant's rule. A no-op for plain, pie and
    /// geo layers, which do not participate in the shared scale mechanism.
    pub fn auto_scale(&mut self) -> Result<(), ChartError> {
        match self.kind() {
            VariantKind::Plain | VariantKind::Pie | VariantKind::Geo => Ok(()),
            VariantKind::Bar => self.auto_scale_band_y(),
            VariantKind::Line | VariantKind::Area => {
                if self.has_nested_data() || self.has_number_column() {
                    self.auto_scale_xyz()
                } else {
                    self.auto_scale_band_y()
                }
            }
            VariantKind::Plot | VariantKind::Bubble => self.auto_scale_xyz(),
        }
    }

    pub(crate) fn auto_scale_band_y(&mut self) -> Result<(), ChartError> {
        if matches!(self.focus, FocusSpec::Auto) {
            let DataVector::Scalars(values) = &self.data else {
                return Err(ChartError::NotOneDimensional);
            };
            let (lo, hi) =
                auto_focus_range(values, self.safe.range).ok_or(ChartError::EmptyData)?;
            self.focus = FocusSpec::Ranges {
                x: None,
                y: Some([lo, hi]),
            };
        }
        let focus_y = match self.focus {
            FocusSpec::Ranges { y: Some(r), .. } => Some((r[0], r[1])),
            _ => None,
        };
        let inputs = ScaleInputs {
            data: &self.data,
            column: self.column.as_ref(),
            margin: self.margin,
            area: self.area,
            safe: &self.safe,
            focus_x: None,
            focus_y,
            label_width: self.label_width(),
        };
        self.scales = Some(derive_band_y(&inputs)?);
        Ok(())
    }

    pub(crate) fn auto_scale_xyz(&mut self) -> Result<(), ChartError> {
        if matches!(self.focus, FocusSpec::Auto) {
            let x_values = self.x_source_values()?;
            let y_values = self.y_source_values();
            let x = auto_focus_range(&x_values, self.safe.range).ok_or(ChartError::EmptyData)?;
            let y = auto_focus_range(&y_values, self.safe.range).ok_or(ChartError::EmptyData)?;
            self.focus = FocusSpec::Ranges {
                x: Some([x.0, x.1]),
                y: Some([y.0, y.1]),
            };
        }
        let (focus_x, focus_y) = match self.focus {
            FocusSpec::Ranges { x, y } => (
                x.map(|r| (r[0], r[1])),
                y.map(|r| (r[0], r[1])),
            ),
            _ => (None, None),
        };
        let inputs = ScaleInputs {
            data: &self.data,
            column: self.column.as_ref(),
            margin: self.margin,
            area: self.area,
            safe: &self.safe,
            focus_x,
            focus_y,
            label_width: self.label_width(),
        };
        self.scales = Some(derive_xyz(&inputs)?);
        Ok(())
    }

    /// Positioning closures over the derived scales.
    pub(crate) fn data_scales(&self) -> Result<DataScales, ChartError> {
        let scales = self
            .scales
            .as_ref()
            .ok_or_else(|| ChartError::ScaleNotReady(self.id.clone()))?;
        let x = match &scales.x {
            crate::scale::XScale::Band(b) => XPos::Band {
                origin: self.margin.left + self.safe.margin.left,
                bandwidth: b.bandwidth(),
            },
            crate::scale::XScale::Linear(l) => XPos::Linear(*l),
        };
        Ok(DataScales {
            x,
            y: scales.y,
            y_offset: self.margin.top,
            z: scales.z,
        })
    }

    // ---- lifecycle -------------------------------------------------------

    /// Renders the layer's shapes (and axes), deriving scales first when
    /// needed.
    pub fn render(&mut self) -> Result<(), ChartError> {
        if self.scales.is_none() {
            self.auto_scale()?;
        }
        match self.kind() {
            VariantKind::Plain => Ok(()),
            VariantKind::Bar => self.render_bar(),
            VariantKind::Line => self.render_line(),
            VariantKind::Area => self.render_area(),
            VariantKind::Plot => self.render_plot_layer(),
            VariantKind::Bubble => self.render_bubble(),
            VariantKind::Pie => self.render_pie(),
            VariantKind::Geo => self.render_geo(),
        }
    }

    /// Replaces the data and refreshes scales and visuals in place.
    ///
    /// The payload must match the current data's length and shape; on
    /// failure the current data is left untouched.
    pub fn update_data(&mut self, data: impl Into<DataVector>) -> Result<(), ChartError> {
        let data = data.into();
        match self.kind() {
            VariantKind::Plain => self.update_data_core(data),
            VariantKind::Bar => self.update_bar(data),
            VariantKind::Line => self.update_line(data),
            VariantKind::Area => self.update_area(data),
            VariantKind::Plot => self.update_plot(data),
            VariantKind::Bubble => self.update_bubble(data),
            VariantKind::Pie => self.update_pie(data),
            VariantKind::Geo => self.update_geo(data),
        }
    }

    pub(crate) fn update_data_core(&mut self, data: DataVector) -> Result<(), ChartError> {
        if data.is_empty() {
            return Err(ChartError::EmptyData);
        }
        if data.len() != self.data.len() {
            return Err(ChartError::LengthMismatch {
                new: data.len(),
                current: self.data.len(),
            });
        }
        if data.arity() != self.data.arity() {
            return Err(ChartError::ShapeMismatch);
        }
        self.data = data;
        Ok(())
    }

    pub(crate) fn elem_id(&self, role: &str, i: usize) -> String {
        format!("{}_{}_{}_{}", self.surface_id, self.id, role, i)
    }

    pub(crate) fn elem_id_single(&self, role: &str) -> String {
        format!("{}_{}_{}", self.surface_id, self.id, role)
    }

    // ---- collision shapes ------------------------------------------------

    /// Creates one enlarged invisible hit-test circle per datum.
    pub(crate) fn set_collision(&mut self) -> Result<(), ChartError> {
        let ds = self.data_scales()?;
        let points = self.normalized_xy_data()?;
        let r = self.font.size * 1.5;
        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.el.collision.clear();
        for (i, p) in points.iter().enumerate() {
            let node = Node::new(
                self.elem_id("collision", i),
                Shape::Circle(Circle::new(Point::new(ds.x(p, i), ds.y(p)), r)),
            )
            .with_class("st-collision")
            .with_pointer_events();
            self.el.collision.push(surface.scene.insert(node));
        }
        Ok(())
    }

    /// Creates one full-height hit-test rectangle per band slot.
    pub(crate) fn set_collision_bar(&mut self) -> Result<(), ChartError> {
        let ds = self.data_scales()?;
        let XPos::Band { origin, bandwidth } = ds.x else {
            return Err(ChartError::ScaleNotReady(self.id.clone()));
        };
        let n = self.data.len();
        let height = self.area.y + self.margin.top;
        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.el.collision.clear();
        for i in 0..n {
            let x = origin + bandwidth * i as f64;
            let node = Node::new(
                self.elem_id("collision-bar", i),
                Shape::Rect(Rect::new(x, 0.0, x + bandwidth, height)),
            )
            .with_class("st-collision")
            .with_pointer_events();
            self.el.collision.push(surface.scene.insert(node));
        }
        Ok(())
    }

    // ---- labels ----------------------------------------------------------

    /// Attaches one label bubble per datum, anchored above the datum's
    /// topmost point.
    ///
    /// With `fade`, labels start transparent and are revealed by hover
    /// (wired by [`Layer::set_transition`]).
    pub fn set_label(&mut self, fade: bool) -> Result<(), ChartError> {
        let LabelState::On(options) = &self.label else {
            return Ok(());
        };
        if !options.visible {
            return Ok(());
        }
        if matches!(self.variant, Variant::Pie(_)) {
            return self.set_label_pie(fade);
        }
        if self.data.is_empty() {
            return Err(ChartError::EmptyData);
        }
        let ds = self.data_scales()?;
        let points = self.normalized_xy_data()?;
        let labels = self.label_array();
        let width = self.label_width();
        let height = self.font.size * 2.0;
        let bubble_paint = if fade {
            Color::TRANSPARENT
        } else {
            self.color.text_background
        };
        let text_paint = if fade {
            Color::TRANSPARENT
        } else {
            self.color.text
        };

        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.unset_label_in(&mut surface.scene);
        for (i, p) in points.iter().enumerate() {
            let anchor = Point::new(ds.x(p, i), ds.y(p) - self.font.size / 2.0);
            let bubble = Node::new(
                format!("{}_bubble", self.elem_id("label", i)),
                Shape::Path(bubble_outline(anchor, width, height, self.font.size)),
            )
            .with_class("st-label")
            .with_fill(bubble_paint)
            .with_stroke(bubble_paint, 1.0);
            let mut text_shape = TextShape::new(
                bubble_text_pos(anchor, height, self.font.size),
                labels[i].clone(),
                self.font.size,
            );
            text_shape.anchor = TextAnchor::Middle;
            let text = Node::new(
                format!("{}_text", self.elem_id("label", i)),
                Shape::Text(text_shape),
            )
            .with_class("st-label")
            .with_fill(text_paint);
            let bubble_id = surface.scene.insert(bubble);
            let text_id = surface.scene.insert(text);
            self.el.labels.push((bubble_id, text_id));
        }
        Ok(())
    }

    /// Removes any rendered labels.
    pub fn unset_label(&mut self) {
        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        self.unset_label_in(&mut surface.scene);
    }

    pub(crate) fn unset_label_in(&mut self, scene: &mut Scene) {
        for (bubble, text) in self.el.labels.drain(..) {
            scene.remove(bubble);
            scene.remove(text);
        }
    }

    /// The paints a datum's shape wears once entry animations finish, when
    /// the shape doubles as its own hit-test element.
    fn shape_final_paints(&self, i: usize) -> Option<(Color, Color)> {
        let values = self.y_source_values();
        let d = values.get(i).copied().unwrap_or(0.0);
        match &self.variant {
            Variant::Bar => Some((
                self.color.fill.resolve(d, i),
                self.color.stroke.resolve(d, i),
            )),
            Variant::Pie(_) => {
                let fill = if self.color.fill.is_per_datum() {
                    self.color.fill.resolve(d, i)
                } else {
                    crate::pie::spectral(i as f64 / self.data.len() as f64)
                };
                Some((fill, self.color.stroke.resolve(d, i)))
            }
            _ => None,
        }
    }

    // ---- hover wiring ----------------------------------------------------

    /// Wires hover fades onto the layer's hit-test shapes.
    ///
    /// Entering a collision shape accents the shape (when an accent color is
    /// configured), reveals the datum's label bubble (when label fading is
    /// on), and runs any custom hooks; leaving reverts everything. Errors
    /// when fades are configured but no hit-test shapes exist yet.
    pub fn set_transition(&mut self) -> Result<(), ChartError> {
        let accent = self.fade.area.accent_color;
        let label_fade = match &self.label {
            LabelState::On(o) => o.fade && !self.el.labels.is_empty(),
            LabelState::Off => false,
        };
        let has_custom = self.fade.area.enter.is_some()
            || self.fade.area.leave.is_some()
            || self.fade.label.enter.is_some()
            || self.fade.label.leave.is_some();
        if accent.is_none() && !label_fade && !has_custom {
            return Ok(());
        }
        if self.el.collision.is_empty() {
            return Err(ChartError::NoCollision(self.id.clone()));
        }

        let text_color = self.color.text;
        let bg_color = self.color.text_background;
        let custom_enter: Vec<HoverAction> = [
            self.fade.area.enter.clone(),
            self.fade.label.enter.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();
        let custom_leave: Vec<HoverAction> = [
            self.fade.area.leave.clone(),
            self.fade.label.leave.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        let svg = SurfaceHandle::clone(&self.svg);
        let mut surface = svg.borrow_mut();
        for (i, &cnode) in self.el.collision.iter().enumerate() {
            // The accent reverts to the shape's intended paints (hit-only
            // overlays revert to transparent).
            let restore = accent.map(|_| {
                let (fill, stroke) = self
                    .shape_final_paints(i)
                    .unwrap_or((Color::TRANSPARENT, Color::TRANSPARENT));
                (Brush::Solid(fill), Brush::Solid(stroke))
            });
            let label_pair =
                (label_fade && i < self.el.labels.len()).then(|| self.el.labels[i]);
            let enter_custom = custom_enter.clone();
            let leave_custom = custom_leave.clone();

            let enter: HoverAction = std::rc::Rc::new(move |scene: &mut Scene, node: NodeId| {
                if let Some(color) = accent {
                    scene.schedule(Transition::new(
                        node,
                        0.0,
                        FADE_MS,
                        vec![
                            AttrTarget::Fill(Brush::Solid(color)),
                            AttrTarget::Stroke(Brush::Solid(color)),
                        ],
                    ));
                }
                if let Some((bubble, text)) = label_pair {
                    scene.schedule(Transition::new(
                        bubble,
                        0.0,
                        FADE_MS,
                        vec![
                            AttrTarget::Fill(Brush::Solid(bg_color)),
                            AttrTarget::Stroke(Brush::Solid(bg_color)),
                        ],
                    ));
                    scene.schedule(Transition::new(
                        text,
                        0.0,
                        FADE_MS,
                        vec![AttrTarget::Fill(Brush::Solid(text_color))],
                    ));
                }
                for hook in &enter_custom {
                    hook(scene, node);
                }
            });
            let restore_leave = restore.clone();
            let leave: HoverAction = std::rc::Rc::new(move |scene: &mut Scene, node: NodeId| {
                if let Some((fill, stroke)) = restore_leave.clone() {
                    scene.schedule(Transition::new(
                        node,
                        0.0,
                        FADE_MS,
                        vec![AttrTarget::Fill(fill), AttrTarget::Stroke(stroke)],
                    ));
                }
                if let Some((bubble, text)) = label_pair {
                    scene.schedule(Transition::new(
                        bubble,
                        0.0,
                        FADE_MS,
                        vec![
                            AttrTarget::Fill(Brush::Solid(Color::TRANSPARENT)),
                            AttrTarget::Stroke(Brush::Solid(Color::TRANSPARENT)),
                        ],
                    ));
                    scene.schedule(Transition::new(
                        text,
                        0.0,
                        FADE_MS,
                        vec![AttrTarget::Fill(Brush::Solid(Color::TRANSPARENT))],
                    ));
                }
                for hook in &leave_custom {
                    hook(scene, node);
                }
            });
            surface.bind_hover(HoverBinding {
                node: cnode,
                enter,
                leave,
            });
        }
        Ok(())
    }
}
