// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Series data shapes.
//!
//! A series is either a run of scalar values or a run of fixed-arity
//! tuples (pairs or triples), optionally accompanied by a parallel
//! [`Column`] of category keys. Shape is part of a layer's identity:
//! updates may replace values but never change length or arity.

use crate::error::ChartError;

/// One series of values: uniformly scalar or uniformly tuple-shaped.
#[derive(Clone, Debug, PartialEq)]
pub enum DataVector {
    /// One value per datum.
    Scalars(Vec<f64>),
    /// `[x, y]` per datum.
    Pairs(Vec<[f64; 2]>),
    /// `[x, y, z]` per datum; `z` commonly drives a radius.
    Triples(Vec<[f64; 3]>),
}

impl DataVector {
    /// Number of data points.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalars(v) => v.len(),
            Self::Pairs(v) => v.len(),
            Self::Triples(v) => v.len(),
        }
    }

    /// Whether the series holds no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Components per datum: 1, 2 or 3.
    pub fn arity(&self) -> usize {
        match self {
            Self::Scalars(_) => 1,
            Self::Pairs(_) => 2,
            Self::Triples(_) => 3,
        }
    }

    /// Whether each datum is a tuple.
    pub fn is_nested(&self) -> bool {
        self.arity() > 1
    }

    /// Whether `other` has the same length and arity.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.len() == other.len() && self.arity() == other.arity()
    }

    /// The values of one component (`dim` 0-based). Scalars expose their
    /// values as component 0.
    pub fn component(&self, dim: usize) -> Vec<f64> {
        match self {
            Self::Scalars(v) => {
                if dim == 0 {
                    v.clone()
                } else {
                    Vec::new()
                }
            }
            Self::Pairs(v) => v.iter().filter_map(|d| d.get(dim).copied()).collect(),
            Self::Triples(v) => v.iter().filter_map(|d| d.get(dim).copied()).collect(),
        }
    }
}

impl From<Vec<f64>> for DataVector {
    fn from(v: Vec<f64>) -> Self {
        Self::Scalars(v)
    }
}

impl From<Vec<[f64; 2]>> for DataVector {
    fn from(v: Vec<[f64; 2]>) -> Self {
        Self::Pairs(v)
    }
}

impl From<Vec<[f64; 3]>> for DataVector {
    fn from(v: Vec<[f64; 3]>) -> Self {
        Self::Triples(v)
    }
}

/// A parallel run of category keys for a series.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Numeric keys; these can drive a continuous x axis.
    Numbers(Vec<f64>),
    /// String keys (category names, dates rendered as text).
    Labels(Vec<String>),
}

impl Column {
    /// Number of keys.
    pub fn len(&self) -> usize {
        match self {
            Self::Numbers(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    /// Whether the column holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the keys are numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numbers(_))
    }

    /// The key at `i`, rendered for display.
    pub fn label_at(&self, i: usize) -> String {
        match self {
            Self::Numbers(v) => v.get(i).copied().map(format_datum).unwrap_or_default(),
            Self::Labels(v) => v.get(i).cloned().unwrap_or_default(),
        }
    }

    /// All keys rendered for display.
    pub fn display_labels(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.label_at(i)).collect()
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Self::Numbers(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Self::Labels(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Self::Labels(v.into_iter().map(str::to_owned).collect())
    }
}

/// A canonicalized data point: x/y always present, z only for triples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatumPoint {
    /// X component (a category index when no numeric x source exists).
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Optional third component.
    pub z: Option<f64>,
}

/// `(min, max)` over the finite values of `values`, or `None` when empty.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if !v.is_finite() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

/// Renders a datum the way an axis or label shows it: integers without a
/// fraction part, everything else in shortest `f64` form.
pub fn format_datum(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Validates that an optional column matches the data length.
pub(crate) fn check_column_length(
    data: &DataVector,
    column: Option<&Column>,
) -> Result<(), ChartError> {
    if let Some(column) = column {
        if column.len() != data.len() {
            return Err(ChartError::ColumnLength {
                column: column.len(),
                data: data.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_skips_non_finite_values() {
        let e = extent([1.0, f64::NAN, 3.0, -2.0]).unwrap();
        assert!((e.0 - -2.0).abs() < 1e-9);
        assert!((e.1 - 3.0).abs() < 1e-9);
        assert!(extent([]).is_none());
    }

    #[test]
    fn component_extracts_tuple_dimensions() {
        let d = DataVector::Triples(vec![[1.0, 10.0, 0.5], [2.0, 20.0, 0.7]]);
        assert_eq!(d.component(2), vec![0.5, 0.7]);
        assert_eq!(d.arity(), 3);
    }

    #[test]
    fn format_datum_drops_trailing_zero_fraction() {
        assert_eq!(format_datum(270.0), "270");
        assert_eq!(format_datum(3.5), "3.5");
    }

    #[test]
    fn same_shape_requires_length_and_arity() {
        let a = DataVector::from(vec![1.0, 2.0]);
        assert!(a.same_shape(&DataVector::from(vec![5.0, 6.0])));
        assert!(!a.same_shape(&DataVector::from(vec![5.0])));
        assert!(!a.same_shape(&DataVector::from(vec![[1.0, 2.0], [3.0, 4.0]])));
    }
}
