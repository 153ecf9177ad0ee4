// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart error taxonomy.
//!
//! Every error here is synchronous and fatal to the operation that raised
//! it; callers are expected to validate configuration up front. After a
//! constructor error the partially-built value is gone — there is no
//! recovery protocol. Asynchronous shape-source failures are *not* errors
//! in this sense: they are logged and the affected shapes simply never
//! render.

use stratum_core::SurfaceError;
use thiserror::Error;

/// Errors raised by layer construction, scaling, rendering and updates.
#[derive(Debug, Error)]
pub enum ChartError {
    /// A layer id was empty or missing.
    #[error("layer id must be specified")]
    MissingId,
    /// A layer type string did not name a known variant.
    #[error("invalid layer type `{0}`")]
    InvalidType(String),
    /// A margin array had an unsupported number of entries.
    #[error("margin array length must be 2 or 3")]
    MarginArity(usize),
    /// A focus range was not a two-element low/high pair.
    #[error("invalid focus range")]
    InvalidFocus,
    /// Column and data lengths differ.
    #[error("column length must be same as data length (column {column}, data {data})")]
    ColumnLength {
        /// Length of the provided column.
        column: usize,
        /// Length of the provided data.
        data: usize,
    },
    /// The dataset was empty.
    #[error("data must have one or more values")]
    EmptyData,
    /// A band-scale path was asked to scale tuple data.
    #[error("band scaling requires one-dimensional data")]
    NotOneDimensional,
    /// A continuous x/y/z path was asked to scale data with no x source.
    #[error("data is not multi-dimensional")]
    NotMultiDimensional,
    /// An update payload did not match the current data length.
    #[error("update data length must be same as previous one (new {new}, current {current})")]
    LengthMismatch {
        /// Length of the rejected update payload.
        new: usize,
        /// Length of the data currently held.
        current: usize,
    },
    /// An update payload changed the scalar/tuple shape or tuple arity.
    #[error("update data must keep the shape of the previous data")]
    ShapeMismatch,
    /// A label or collision operation ran before any scale was derived.
    #[error("no scale has been derived for layer `{0}`")]
    ScaleNotReady(String),
    /// Hover wiring was requested but no hit-test shapes exist.
    #[error("fade hooks need collision shapes for layer `{0}`")]
    NoCollision(String),
    /// A figure lookup named an unknown series.
    #[error("no series `{0}`")]
    NoSeries(String),
    /// A figure already holds a layer with this id.
    #[error("series `{0}` already exists")]
    DuplicateSeries(String),
    /// A geo layer was constructed without any shape source.
    #[error("a shape source must be specified for a geo layer")]
    MissingSource,
    /// A geo layer needs a column to join features to data.
    #[error("a geo layer needs a column of feature ids")]
    MissingColumn,
    /// A batch add was invoked with no configurations.
    #[error("config list has zero length")]
    EmptyBatch,
    /// Surface resolution failed.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
