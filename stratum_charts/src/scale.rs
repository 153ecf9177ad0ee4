// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry/scale resolver.
//!
//! Scales map data domains into pixel ranges. Two derivation paths exist,
//! selected by the data shape:
//!
//! - **Band + y** ([`derive_band_y`]): scalar data on a categorical x axis
//!   (category labels, or 1..=N when no column exists) with a continuous,
//!   "niced" y axis.
//! - **Continuous x/y/z** ([`derive_xyz`]): tuple data, or scalar data with
//!   a numeric column, mapped onto two (optionally three) linear scales.
//!
//! Both paths fold the layer's outer margins and fail-safe margins into the
//! pixel ranges, so a scaled value can be plotted without further offset
//! arithmetic on the x axis. Y ranges are inverted: larger data values map
//! to smaller pixel y.

use crate::config::{Area, Margin};
use crate::data::{Column, DataVector, extent};
use crate::error::ChartError;
use crate::fsr::SafeRegion;

/// A linear mapping from a continuous domain to a continuous pixel range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// The configured domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// The configured pixel range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Rounds the domain outward to tick-friendly values (d3-style `nice`).
    ///
    /// The domain never shrinks.
    pub fn nice(mut self) -> Self {
        let (mut a, mut b) = self.domain;
        if a == b || !a.is_finite() || !b.is_finite() {
            return self;
        }
        let flipped = a > b;
        if flipped {
            core::mem::swap(&mut a, &mut b);
        }
        let step = nice_step((b - a) / 10.0);
        if step > 0.0 {
            a = (a / step).floor() * step;
            b = (b / step).ceil() * step;
        }
        self.domain = if flipped { (b, a) } else { (a, b) };
        self
    }

    /// Returns nice-ish tick values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut min, mut max) = self.domain;
        if count == 0 {
            return Vec::new();
        }
        if min == max {
            return vec![min];
        }
        if min > max {
            core::mem::swap(&mut min, &mut max);
        }
        let step = nice_step((max - min) / count.max(1) as f64);
        if step == 0.0 {
            return vec![min, max];
        }
        let start = (min / step).ceil() * step;
        let mut out = Vec::new();
        let mut v = start;
        let mut i = 0u32;
        while v <= max + step * 1e-9 && i < 10_000 {
            out.push(start + step * f64::from(i));
            i += 1;
            v = start + step * f64::from(i);
        }
        out
    }
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// A categorical axis mapping: each category occupies an equal-width slot.
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
    labels: Vec<String>,
    range: (f64, f64),
}

impl BandScale {
    /// Creates a band scale over `labels` covering `range`.
    pub fn new(labels: Vec<String>, range: (f64, f64)) -> Self {
        Self { labels, range }
    }

    /// Number of categories.
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    /// The category labels, in slot order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The configured pixel range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// The per-category slot width.
    pub fn bandwidth(&self) -> f64 {
        let n = self.labels.len();
        if n == 0 {
            return 0.0;
        }
        (self.range.1 - self.range.0) / n as f64
    }

    /// Pixel position of the left edge of slot `index`.
    pub fn position(&self, index: usize) -> f64 {
        self.range.0 + self.bandwidth() * index as f64
    }
}

/// The x-axis mapping of a scale set: categorical or continuous.
#[derive(Clone, Debug, PartialEq)]
pub enum XScale {
    /// Band (categorical) mapping.
    Band(BandScale),
    /// Linear (continuous) mapping.
    Linear(LinearScale),
}

impl XScale {
    /// Whether this is a band mapping.
    pub fn is_band(&self) -> bool {
        matches!(self, Self::Band(_))
    }

    /// The band scale, when categorical.
    pub fn as_band(&self) -> Option<&BandScale> {
        match self {
            Self::Band(b) => Some(b),
            Self::Linear(_) => None,
        }
    }

    /// The linear scale, when continuous.
    pub fn as_linear(&self) -> Option<&LinearScale> {
        match self {
            Self::Band(_) => None,
            Self::Linear(l) => Some(l),
        }
    }
}

/// The resolved coordinate mappings of one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleSet {
    /// X mapping.
    pub x: XScale,
    /// Y mapping (inverted pixel axis).
    pub y: LinearScale,
    /// Optional radius-like third mapping.
    pub z: Option<LinearScale>,
}

/// Everything scale derivation needs from a layer.
#[derive(Debug)]
pub struct ScaleInputs<'a> {
    /// Series data.
    pub data: &'a DataVector,
    /// Optional category column.
    pub column: Option<&'a Column>,
    /// Normalized outer margins.
    pub margin: Margin,
    /// Normalized drawing area.
    pub area: Area,
    /// The layer's fail-safe region.
    pub safe: &'a SafeRegion,
    /// Resolved x focus range, if any.
    pub focus_x: Option<(f64, f64)>,
    /// Resolved y focus range, if any.
    pub focus_y: Option<(f64, f64)>,
    /// Width of the layer's widest label (band x-boundary compensation).
    pub label_width: f64,
}

/// Derives the padded focus range for a scalar series:
/// `[floor(min / (1 + r)), ceil(max · (1 + r))]`.
pub fn auto_focus_range(values: &[f64], r: f64) -> Option<(f64, f64)> {
    let (min, max) = extent(values.iter().copied())?;
    Some(((min / (1.0 + r)).floor(), (max * (1.0 + r)).ceil()))
}

/// Band x + linear y derivation for scalar data.
pub fn derive_band_y(inp: &ScaleInputs<'_>) -> Result<ScaleSet, ChartError> {
    if inp.data.is_empty() {
        return Err(ChartError::EmptyData);
    }
    let DataVector::Scalars(values) = inp.data else {
        return Err(ChartError::NotOneDimensional);
    };

    let labels = match inp.column {
        Some(column) => column.display_labels(),
        None => (1..=values.len()).map(|i| i.to_string()).collect(),
    };
    let x_boundary =
        inp.area.x - inp.label_width / 2.0 - inp.margin.right - inp.safe.margin.right;
    let x = BandScale::new(
        labels,
        (inp.margin.left + inp.safe.margin.left, x_boundary),
    );

    let (min, max) = extent(values.iter().copied()).ok_or(ChartError::EmptyData)?;
    let domain = inp
        .focus_y
        .unwrap_or((if min > 0.0 { 0.0 } else { min }, max + 1.0));
    let y = LinearScale::new(domain, (inp.area.y, inp.safe.margin.top)).nice();

    Ok(ScaleSet {
        x: XScale::Band(x),
        y,
        z: None,
    })
}

/// Continuous x/y (and optional z) derivation for tuple data or scalar data
/// with a numeric column.
pub fn derive_xyz(inp: &ScaleInputs<'_>) -> Result<ScaleSet, ChartError> {
    if inp.data.is_empty() {
        return Err(ChartError::EmptyData);
    }

    let x_values: Vec<f64> = match (inp.column, inp.data.is_nested()) {
        (Some(Column::Numbers(v)), _) => v.clone(),
        (_, true) => inp.data.component(0),
        _ => return Err(ChartError::NotMultiDimensional),
    };
    let y_values = if inp.data.is_nested() {
        inp.data.component(1)
    } else {
        inp.data.component(0)
    };

    let (x_min_raw, x_max_raw) = extent(x_values.iter().copied()).ok_or(ChartError::EmptyData)?;
    let (y_min_raw, y_max_raw) = extent(y_values.iter().copied()).ok_or(ChartError::EmptyData)?;
    let r = inp.safe.range;
    let x_max = (x_max_raw * (1.0 + r)).ceil();
    let x_min = if x_min_raw > 0.0 { 0.0 } else { x_min_raw };
    let y_max = (y_max_raw * (1.0 + r)).ceil();
    let y_min = if y_min_raw > 0.0 { 0.0 } else { y_min_raw };

    let z = if inp.data.arity() == 3 {
        let z_values = inp.data.component(2);
        let (z_min, z_max) = extent(z_values.iter().copied()).ok_or(ChartError::EmptyData)?;
        Some(LinearScale::new((z_min, z_max), (inp.margin.z, inp.area.z)))
    } else {
        None
    };
    // The pixel size of the largest marker; focus ranges widen to keep it
    // inside the plot.
    let margin_safe_by_z = z
        .as_ref()
        .map(|zs| zs.map(zs.domain().1))
        .unwrap_or(0.0);

    let x_range = (
        inp.margin.left + inp.safe.margin.left,
        inp.area.x - inp.safe.margin.right,
    );
    let x = match inp.focus_x {
        Some((lo, hi)) => {
            // Two passes: a trial scale measures pixels-per-unit, then the
            // domain widens by the marker radius expressed in data units.
            // This reuses the trial ratio rather than iterating to a fixed
            // point; see the module docs for why the heuristic stays.
            let trial = LinearScale::new((lo, hi), x_range);
            let ratio = trial.map(2.0) - trial.map(1.0);
            let add = if ratio != 0.0 {
                margin_safe_by_z / ratio * 1.5
            } else {
                0.0
            };
            LinearScale::new((lo - add, hi + add), x_range)
        }
        None => LinearScale::new((x_min, x_max), x_range),
    };

    let y_range = (inp.area.y - inp.margin.top, inp.safe.margin.top);
    let y = match inp.focus_y {
        Some((lo, hi)) => {
            let trial = LinearScale::new((lo, hi), y_range);
            let ratio = trial.map(1.0) - trial.map(2.0);
            let add = if ratio != 0.0 {
                margin_safe_by_z / ratio * 1.5
            } else {
                0.0
            };
            LinearScale::new((lo - add, hi + add), y_range)
        }
        None => LinearScale::new((y_min, y_max), y_range),
    };

    Ok(ScaleSet {
        x: XScale::Linear(x),
        y,
        z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Area, Margin};

    fn area() -> Area {
        Area {
            x: 300.0,
            y: 150.0,
            z: 37.0,
        }
    }

    fn inputs<'a>(data: &'a DataVector, safe: &'a SafeRegion) -> ScaleInputs<'a> {
        ScaleInputs {
            data,
            column: None,
            margin: Margin::default(),
            area: area(),
            safe,
            focus_x: None,
            focus_y: None,
            label_width: 0.0,
        }
    }

    #[test]
    fn linear_maps_domain_ends_to_range_ends() {
        let s = LinearScale::new((0.0, 10.0), (150.0, 40.0));
        assert!((s.map(0.0) - 150.0).abs() < 1e-9);
        assert!((s.map(10.0) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn nice_never_shrinks_the_domain() {
        let s = LinearScale::new((0.3, 9.7), (0.0, 1.0)).nice();
        let (a, b) = s.domain();
        assert!(a <= 0.3);
        assert!(b >= 9.7);
    }

    #[test]
    fn band_width_times_count_covers_the_range() {
        let b = BandScale::new(
            vec!["a".into(), "b".into(), "c".into()],
            (10.0, 100.0),
        );
        assert!((b.bandwidth() * 3.0 - 90.0).abs() < 1e-9);
        assert!((b.position(0) - 10.0).abs() < 1e-9);
        assert!(b.position(1) > b.position(0));
    }

    #[test]
    fn band_y_inverts_the_y_axis() {
        let data = DataVector::from(vec![214.0, 45.0, 134.0, 270.0, 157.0]);
        let safe = SafeRegion::computed(10.0, 270.0, area(), false);
        let scales = derive_band_y(&inputs(&data, &safe)).unwrap();
        assert!(scales.y.map(270.0) < scales.y.map(45.0));
        // Natural minimum ≥ 0 clamps the lower bound to 0.
        assert!(scales.y.domain().0 <= 0.0);
    }

    #[test]
    fn band_y_rejects_tuple_data() {
        let data = DataVector::from(vec![[1.0, 2.0], [3.0, 4.0]]);
        let safe = SafeRegion::disabled(area());
        assert!(matches!(
            derive_band_y(&inputs(&data, &safe)),
            Err(ChartError::NotOneDimensional)
        ));
    }

    #[test]
    fn empty_data_is_a_scale_error() {
        let data = DataVector::Scalars(Vec::new());
        let safe = SafeRegion::disabled(area());
        assert!(matches!(
            derive_band_y(&inputs(&data, &safe)),
            Err(ChartError::EmptyData)
        ));
        assert!(matches!(
            derive_xyz(&inputs(&data, &safe)),
            Err(ChartError::EmptyData)
        ));
    }

    #[test]
    fn xyz_requires_an_x_source() {
        let data = DataVector::from(vec![5.0, 10.0]);
        let safe = SafeRegion::disabled(area());
        assert!(matches!(
            derive_xyz(&inputs(&data, &safe)),
            Err(ChartError::NotMultiDimensional)
        ));
    }

    #[test]
    fn xyz_negative_minimum_is_kept() {
        let data = DataVector::from(vec![[1.0, -5.0], [4.0, 9.0]]);
        let safe = SafeRegion::disabled(area());
        let scales = derive_xyz(&inputs(&data, &safe)).unwrap();
        assert!((scales.y.domain().0 - -5.0).abs() < 1e-9);
        // Positive minimum clamps to zero instead.
        let data = DataVector::from(vec![[1.0, 5.0], [4.0, 9.0]]);
        let scales = derive_xyz(&inputs(&data, &safe)).unwrap();
        assert!((scales.y.domain().0 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn focus_with_z_widens_the_domain_for_marker_headroom() {
        let data = DataVector::from(vec![[1.0, 1.0, 1.0], [10.0, 10.0, 5.0]]);
        let safe = SafeRegion::disabled(area());
        let mut inp = inputs(&data, &safe);
        inp.focus_x = Some((1.0, 10.0));
        inp.focus_y = Some((1.0, 10.0));
        let scales = derive_xyz(&inp).unwrap();
        let (x_lo, x_hi) = scales
            .x
            .as_linear()
            .expect("continuous x expected")
            .domain();
        assert!(x_lo < 1.0);
        assert!(x_hi > 10.0);
        // Without z the focus range is used as-is.
        let data = DataVector::from(vec![[1.0, 1.0], [10.0, 10.0]]);
        let mut inp = inputs(&data, &safe);
        inp.focus_x = Some((1.0, 10.0));
        let scales = derive_xyz(&inp).unwrap();
        let (x_lo, x_hi) = scales.x.as_linear().unwrap().domain();
        assert!((x_lo - 1.0).abs() < 1e-9 && (x_hi - 10.0).abs() < 1e-9);
    }

    #[test]
    fn auto_focus_pads_both_ends() {
        let (lo, hi) = auto_focus_range(&[10.0, 100.0], 0.1).unwrap();
        assert!(lo <= 10.0 / 1.1);
        assert!(hi >= 110.0);
    }
}
