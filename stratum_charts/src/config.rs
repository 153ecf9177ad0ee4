// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer configuration records.
//!
//! A [`LayerConfig`] is the one external input surface of this crate: an
//! immutable record describing a layer. Every optional field has a
//! documented default and is merged into a normalized value object exactly
//! once, at layer construction; nothing mutates a config in place
//! afterwards.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use peniko::Color;
use peniko::color::palette::css;
use stratum_core::{HoverAction, SurfaceSpec};

use crate::data::{Column, DataVector};
use crate::error::ChartError;
use crate::geo::ShapeSource;

/// The closed set of chart variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// A bare layer: no auto-scale, no draw routine of its own.
    Plain,
    /// Vertical bars on a band x scale.
    Bar,
    /// A polyline, optionally smoothed.
    Line,
    /// A filled line down to the baseline.
    Area,
    /// Scatter plot markers.
    Plot,
    /// Scatter markers with a data-driven radius.
    Bubble,
    /// Pie / donut sectors.
    Pie,
    /// Geographic choropleth from external shape sources.
    Geo,
}

impl FromStr for VariantKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "area" => Ok(Self::Area),
            "plot" => Ok(Self::Plot),
            "bubble" => Ok(Self::Bubble),
            "pie" => Ok(Self::Pie),
            "geo" => Ok(Self::Geo),
            other => Err(ChartError::InvalidType(other.to_owned())),
        }
    }
}

/// Font parameters used for labels, axis text and margin estimation.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Font size in scene units.
    pub size: f64,
    /// Font family name (informational; measurement is heuristic).
    pub family: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            size: 10.0,
            family: String::new(),
        }
    }
}

/// Margin input: a single number, an ordered pair/triple, or a field map.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MarginSpec {
    /// No margin configured (all zero).
    #[default]
    Unset,
    /// One number applied to both top and left.
    Uniform(f64),
    /// `[top, left]` or `[top, left, z]`.
    Array(Vec<f64>),
    /// Individual fields; unset fields stay zero.
    Map {
        /// Top margin.
        top: Option<f64>,
        /// Left margin.
        left: Option<f64>,
        /// Right margin.
        right: Option<f64>,
        /// Z (radius) margin.
        z: Option<f64>,
        /// Alias for `z` used by bubble layers.
        radius: Option<f64>,
    },
}

/// Normalized margin values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margin {
    /// Top margin.
    pub top: f64,
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
    /// Z (radius-domain) margin.
    pub z: f64,
}

impl MarginSpec {
    /// Shorthand for a top/left/right field map.
    pub fn map(top: f64, left: f64, right: f64) -> Self {
        Self::Map {
            top: Some(top),
            left: Some(left),
            right: Some(right),
            z: None,
            radius: None,
        }
    }

    /// Shorthand for a left-only margin.
    pub fn left(left: f64) -> Self {
        Self::Map {
            top: None,
            left: Some(left),
            right: None,
            z: None,
            radius: None,
        }
    }

    pub(crate) fn normalize(&self) -> Result<Margin, ChartError> {
        match self {
            Self::Unset => Ok(Margin::default()),
            Self::Uniform(n) => Ok(Margin {
                top: *n,
                left: *n,
                ..Margin::default()
            }),
            Self::Array(values) => match values.as_slice() {
                [top, left] => Ok(Margin {
                    top: *top,
                    left: *left,
                    ..Margin::default()
                }),
                [top, left, z] => Ok(Margin {
                    top: *top,
                    left: *left,
                    right: 0.0,
                    z: *z,
                }),
                other => Err(ChartError::MarginArity(other.len())),
            },
            Self::Map {
                top,
                left,
                right,
                z,
                radius,
            } => Ok(Margin {
                top: top.unwrap_or(0.0),
                left: left.unwrap_or(0.0),
                right: right.unwrap_or(0.0),
                z: z.or(*radius).unwrap_or(0.0),
            }),
        }
    }
}

/// Drawing-area input: a single number (square) or a field map. Defaults to
/// the full surface size.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AreaSpec {
    /// Use the full surface size.
    #[default]
    Full,
    /// A square area of the given side.
    Square(f64),
    /// Individual fields; unset fields fall back to the surface size.
    Map {
        /// Drawing width.
        x: Option<f64>,
        /// Drawing height.
        y: Option<f64>,
        /// Radius-domain limit.
        z: Option<f64>,
        /// Alias for `z` used by bubble layers.
        radius: Option<f64>,
    },
}

/// Normalized drawing-area values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Area {
    /// Drawing width.
    pub x: f64,
    /// Drawing height.
    pub y: f64,
    /// Radius-domain limit.
    pub z: f64,
}

impl AreaSpec {
    /// Shorthand for a width/height field map.
    pub fn size(x: f64, y: f64) -> Self {
        Self::Map {
            x: Some(x),
            y: Some(y),
            z: None,
            radius: None,
        }
    }

    pub(crate) fn normalize(&self, surface_w: f64, surface_h: f64) -> Area {
        match self {
            Self::Full => Area {
                x: surface_w,
                y: surface_h,
                z: (surface_h / 4.0).floor(),
            },
            Self::Square(n) => Area {
                x: *n,
                y: *n,
                z: (n / 4.0).floor(),
            },
            Self::Map { x, y, z, radius } => {
                let x = x.unwrap_or(surface_w);
                let y = y.unwrap_or(surface_h);
                Area {
                    x,
                    y,
                    z: z.or(*radius).unwrap_or_else(|| (x * y).sqrt() / 5.0),
                }
            }
        }
    }
}

/// Caller overrides for computed fail-safe margins.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SafeMarginOverride {
    /// Top safety margin.
    pub top: Option<f64>,
    /// Left safety margin.
    pub left: Option<f64>,
    /// Right safety margin.
    pub right: Option<f64>,
    /// Bottom safety margin.
    pub bottom: Option<f64>,
    /// Z safety constant.
    pub z: Option<f64>,
}

/// Caller overrides for the shrunk safe drawing area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SafeAreaOverride {
    /// Safe width.
    pub x: Option<f64>,
    /// Safe height.
    pub y: Option<f64>,
    /// Safe radius headroom.
    pub z: Option<f64>,
}

/// Caller-supplied fail-safe region values, merged over the zeroed base.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SafeOverride {
    /// Margin overrides.
    pub margin: SafeMarginOverride,
    /// Area overrides.
    pub area: SafeAreaOverride,
    /// Domain padding tolerance override.
    pub range: Option<f64>,
}

/// Fail-safe region input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SafeSpec {
    /// Compute margins from font metrics and the largest label.
    #[default]
    Auto,
    /// Disable the fail-safe region entirely (all-zero margins).
    Disabled,
    /// Use the caller's values on top of the zeroed base.
    Override(SafeOverride),
}

/// A focus (forced domain) request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FocusSpec {
    /// No focus; domains come from data extents.
    #[default]
    Off,
    /// Derive a padded range from the data once, at first scaling.
    Auto,
    /// Explicit per-axis ranges; omitted axes fall back to data extents.
    Ranges {
        /// `[low, high]` for the x axis.
        x: Option<[f64; 2]>,
        /// `[low, high]` for the y axis.
        y: Option<[f64; 2]>,
    },
}

impl FocusSpec {
    pub(crate) fn validate(&self) -> Result<(), ChartError> {
        if let Self::Ranges { x, y } = self {
            for range in [x, y].into_iter().flatten() {
                if !range[0].is_finite() || !range[1].is_finite() {
                    return Err(ChartError::InvalidFocus);
                }
            }
        }
        Ok(())
    }
}

/// Which axis sides are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisSides {
    /// Draw an x axis at the default (bottom) side.
    pub x: bool,
    /// Draw a y axis at the default (left) side.
    pub y: bool,
    /// Draw the y axis on the left.
    pub left: bool,
    /// Draw the y axis on the right.
    pub right: bool,
    /// Draw the x axis on the top.
    pub top: bool,
    /// Draw the x axis on the bottom.
    pub bottom: bool,
}

impl AxisSides {
    /// Bottom x axis plus left y axis.
    pub fn bottom_left() -> Self {
        Self {
            x: true,
            y: true,
            ..Self::default()
        }
    }

    pub(crate) fn has_x(&self) -> bool {
        self.x || self.top || self.bottom
    }

    pub(crate) fn has_y(&self) -> bool {
        self.y || self.left || self.right
    }
}

/// Per-axis tick overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOptions {
    /// Draw inner (grid-length) tick lines across the plot.
    pub inner: bool,
    /// Explicit tick values; empty means automatic ticks.
    pub values: Vec<f64>,
}

/// Tick overrides for both axes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TicksSpec {
    /// X-axis ticks.
    pub x: TickOptions,
    /// Y-axis ticks.
    pub y: TickOptions,
}

/// A paint that is either a literal color or a per-datum function of
/// `(datum, index)`.
#[derive(Clone)]
pub enum Paint {
    /// A literal color.
    Solid(Color),
    /// A color computed per datum.
    PerDatum(Rc<dyn Fn(f64, usize) -> Color>),
}

impl Paint {
    /// Resolves the paint for one datum.
    pub fn resolve(&self, datum: f64, index: usize) -> Color {
        match self {
            Self::Solid(c) => *c,
            Self::PerDatum(f) => f(datum, index),
        }
    }

    /// Whether this paint is datum-dependent.
    pub fn is_per_datum(&self) -> bool {
        matches!(self, Self::PerDatum(_))
    }
}

impl fmt::Debug for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solid(c) => f.debug_tuple("Solid").field(c).finish(),
            Self::PerDatum(_) => f.write_str("PerDatum(..)"),
        }
    }
}

impl From<Color> for Paint {
    fn from(c: Color) -> Self {
        Self::Solid(c)
    }
}

/// Color configuration for a layer's shapes, labels and axes.
#[derive(Clone, Debug)]
pub struct ColorTheme {
    /// Shape fill.
    pub fill: Paint,
    /// Shape stroke.
    pub stroke: Paint,
    /// Label text color.
    pub text: Color,
    /// Label bubble background color.
    pub text_background: Color,
    /// Axis line color.
    pub axe: Color,
    /// Axis text color.
    pub axe_text: Color,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            fill: Paint::Solid(css::GREEN),
            stroke: Paint::Solid(css::BLACK),
            text: css::BLACK,
            text_background: css::WHITE,
            axe: css::BLACK,
            axe_text: css::BLACK,
        }
    }
}

/// Hover actions for one fade target.
#[derive(Clone, Default)]
pub struct FadeActions {
    /// Custom action on pointer enter.
    pub enter: Option<HoverAction>,
    /// Custom action on pointer leave.
    pub leave: Option<HoverAction>,
    /// Accent color applied to the shape while hovered.
    pub accent_color: Option<Color>,
}

impl fmt::Debug for FadeActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FadeActions")
            .field("enter", &self.enter.is_some())
            .field("leave", &self.leave.is_some())
            .field("accent_color", &self.accent_color)
            .finish()
    }
}

/// Fade configuration per target.
#[derive(Clone, Debug, Default)]
pub struct FadeSpec {
    /// Label bubble fading.
    pub label: FadeActions,
    /// Shape accent fading.
    pub area: FadeActions,
}

impl FadeSpec {
    /// Shorthand: accent-color the shapes on hover.
    pub fn accent(color: Color) -> Self {
        Self {
            area: FadeActions {
                accent_color: Some(color),
                ..FadeActions::default()
            },
            ..Self::default()
        }
    }
}

/// Label options.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelOptions {
    /// Whether labels render at all.
    pub visible: bool,
    /// Whether labels start hidden and fade in on hover.
    pub fade: bool,
    /// Rotate x-axis tick labels 90 degrees.
    pub rotate: bool,
    /// Prefix prepended to every label (geo layers).
    pub prefix: String,
    /// Feature property names joined into geo labels.
    pub properties: Vec<String>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            visible: true,
            fade: true,
            rotate: false,
            prefix: String::new(),
            properties: Vec::new(),
        }
    }
}

/// Label input: on by default, or disabled, or configured.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LabelSpec {
    /// Default label behavior.
    #[default]
    Default,
    /// No labels for this layer.
    Off,
    /// Configured label behavior.
    On(LabelOptions),
}

/// Relation-group membership.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RelSpec {
    /// Not related to other layers.
    #[default]
    None,
    /// Related to one partner layer.
    Partner(String),
    /// Related to an explicit list of layers. The declaring layer's own id
    /// is appended if absent.
    Group(Vec<String>),
}

/// Pie-only angular and radial parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PieConfig {
    /// Start angle in radians (clockwise from 12 o'clock). Default 0.
    pub rad_start: Option<f64>,
    /// End angle in radians. Default `2π`.
    pub rad_end: Option<f64>,
    /// Outer radius in scene units. Default `sqrt(area.x · area.y) / 2.5`.
    pub radius: Option<f64>,
    /// Inner radius (0 for a full pie).
    pub inner_radius: Option<f64>,
    /// Sweep direction; `false` runs anti-clockwise. Default `true`.
    pub clockwise: bool,
}

impl PieConfig {
    /// A default, clockwise full-circle pie.
    pub fn new() -> Self {
        Self {
            clockwise: true,
            ..Self::default()
        }
    }
}

/// Geo-only parameters.
#[derive(Clone, Debug)]
pub struct GeoConfig {
    /// One or more shape sources (inline documents or URIs).
    pub src: Vec<ShapeSource>,
    /// Projection center as `[longitude, latitude]`.
    pub location: [f64; 2],
    /// Zoom factor for the projection.
    pub zoom: f64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            src: Vec::new(),
            location: [140.78, 35.48],
            zoom: 1.0,
        }
    }
}

/// The full configuration record for one layer.
///
/// Construct with [`LayerConfig::new`] and chain `with_*` setters; only
/// `id`, `kind` and `data` are required.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    /// Unique layer identity within a figure.
    pub id: String,
    /// Chart variant.
    pub kind: VariantKind,
    /// Series data.
    pub data: DataVector,
    /// Optional parallel category column.
    pub column: Option<Column>,
    /// Outer margin.
    pub margin: MarginSpec,
    /// Drawing area.
    pub area: AreaSpec,
    /// Fail-safe region control.
    pub safe: SafeSpec,
    /// Entry animation; `false` applies final attributes immediately.
    pub animation: bool,
    /// Focus (forced domain) request.
    pub focus: FocusSpec,
    /// Which axis sides to draw.
    pub axe: AxisSides,
    /// Tick overrides.
    pub ticks: TicksSpec,
    /// Colors.
    pub color: ColorTheme,
    /// Hover fade hooks.
    pub fade: FadeSpec,
    /// Label behavior.
    pub label: LabelSpec,
    /// Relation-group membership.
    pub rel: RelSpec,
    /// Curve smoothing for line/area variants.
    pub smooth: bool,
    /// Draw point markers on line layers; `Some(false)` disables.
    pub plot: Option<bool>,
    /// Pie parameters.
    pub pie: PieConfig,
    /// Geo parameters.
    pub geo: GeoConfig,
    /// Font parameters.
    pub font: Font,
    /// Where to draw. Figures fill this in for their layers; standalone
    /// layers must set it.
    pub svg: Option<SurfaceSpec>,
}

impl LayerConfig {
    /// Creates a config with required fields and defaults everywhere else.
    pub fn new(id: impl Into<String>, kind: VariantKind, data: impl Into<DataVector>) -> Self {
        Self {
            id: id.into(),
            kind,
            data: data.into(),
            column: None,
            margin: MarginSpec::default(),
            area: AreaSpec::default(),
            safe: SafeSpec::default(),
            animation: true,
            focus: FocusSpec::default(),
            axe: AxisSides::default(),
            ticks: TicksSpec::default(),
            color: ColorTheme::default(),
            fade: FadeSpec::default(),
            label: LabelSpec::default(),
            rel: RelSpec::default(),
            smooth: false,
            plot: None,
            pie: PieConfig::new(),
            geo: GeoConfig::default(),
            font: Font::default(),
            svg: None,
        }
    }

    /// Sets the category column.
    pub fn with_column(mut self, column: impl Into<Column>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Sets the margin.
    pub fn with_margin(mut self, margin: MarginSpec) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the drawing area.
    pub fn with_area(mut self, area: AreaSpec) -> Self {
        self.area = area;
        self
    }

    /// Sets fail-safe region control.
    pub fn with_safe(mut self, safe: SafeSpec) -> Self {
        self.safe = safe;
        self
    }

    /// Enables or disables the entry animation.
    pub fn with_animation(mut self, animation: bool) -> Self {
        self.animation = animation;
        self
    }

    /// Sets the focus request.
    pub fn with_focus(mut self, focus: FocusSpec) -> Self {
        self.focus = focus;
        self
    }

    /// Sets which axis sides are drawn.
    pub fn with_axes(mut self, axe: AxisSides) -> Self {
        self.axe = axe;
        self
    }

    /// Sets tick overrides.
    pub fn with_ticks(mut self, ticks: TicksSpec) -> Self {
        self.ticks = ticks;
        self
    }

    /// Sets colors.
    pub fn with_color(mut self, color: ColorTheme) -> Self {
        self.color = color;
        self
    }

    /// Sets hover fade hooks.
    pub fn with_fade(mut self, fade: FadeSpec) -> Self {
        self.fade = fade;
        self
    }

    /// Sets label behavior.
    pub fn with_label(mut self, label: LabelSpec) -> Self {
        self.label = label;
        self
    }

    /// Declares relation-group membership.
    pub fn with_rel(mut self, rel: RelSpec) -> Self {
        self.rel = rel;
        self
    }

    /// Enables curve smoothing (line/area).
    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    /// Enables or disables point markers on line layers.
    pub fn with_plot(mut self, plot: bool) -> Self {
        self.plot = Some(plot);
        self
    }

    /// Sets pie parameters.
    pub fn with_pie(mut self, pie: PieConfig) -> Self {
        self.pie = pie;
        self
    }

    /// Sets geo parameters.
    pub fn with_geo(mut self, geo: GeoConfig) -> Self {
        self.geo = geo;
        self
    }

    /// Sets the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    /// Sets the surface to draw into.
    pub fn with_surface(mut self, svg: SurfaceSpec) -> Self {
        self.svg = Some(svg);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_accepts_number_pair_triple_and_map() {
        let m = MarginSpec::Uniform(20.0).normalize().unwrap();
        assert!((m.top - 20.0).abs() < 1e-9 && (m.left - 20.0).abs() < 1e-9);

        let m = MarginSpec::Array(vec![5.0, 8.0]).normalize().unwrap();
        assert!((m.top - 5.0).abs() < 1e-9 && (m.left - 8.0).abs() < 1e-9);

        let m = MarginSpec::Array(vec![5.0, 8.0, 3.0]).normalize().unwrap();
        assert!((m.z - 3.0).abs() < 1e-9);

        assert!(matches!(
            MarginSpec::Array(vec![1.0]).normalize(),
            Err(ChartError::MarginArity(1))
        ));

        let m = MarginSpec::map(1.0, 2.0, 3.0).normalize().unwrap();
        assert!((m.right - 3.0).abs() < 1e-9);
    }

    #[test]
    fn area_defaults_to_surface_size() {
        let a = AreaSpec::Full.normalize(300.0, 150.0);
        assert!((a.x - 300.0).abs() < 1e-9);
        assert!((a.y - 150.0).abs() < 1e-9);
        assert!((a.z - 37.0).abs() < 1e-9);

        let a = AreaSpec::Map {
            x: Some(200.0),
            y: None,
            z: None,
            radius: None,
        }
        .normalize(300.0, 150.0);
        assert!((a.y - 150.0).abs() < 1e-9);
        assert!((a.z - (200.0_f64 * 150.0).sqrt() / 5.0).abs() < 1e-9);
    }

    #[test]
    fn variant_kind_parses_known_names_only() {
        assert_eq!("bubble".parse::<VariantKind>().unwrap(), VariantKind::Bubble);
        assert!(matches!(
            "sankey".parse::<VariantKind>(),
            Err(ChartError::InvalidType(t)) if t == "sankey"
        ));
    }

    #[test]
    fn non_finite_focus_is_rejected() {
        let focus = FocusSpec::Ranges {
            x: Some([0.0, f64::NAN]),
            y: None,
        };
        assert!(focus.validate().is_err());
    }
}
