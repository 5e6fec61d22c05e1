//! Error types for the presenter engine.

use crate::data::{ColumnId, ValueKind};
use crate::grid::Axis;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine's public operations.
///
/// Binding failures never appear here: a failed reverse update becomes an
/// [`InputError`](crate::validation::InputError) stored on the presenter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Grid definition error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Data source error.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Core plumbing error.
    #[error(transparent)]
    Core(#[from] horizon_datagrid_core::CoreError),

    /// Thread pool error.
    #[error(transparent)]
    ThreadPool(#[from] horizon_datagrid_core::ThreadPoolError),
}

/// Errors from grid track collections.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// The collection was sealed and no longer accepts tracks.
    #[error("{axis} track collection is sealed")]
    Sealed { axis: Axis },

    /// A track was added out of ordinal order.
    #[error("{axis} track ordinal {ordinal} does not follow {last}")]
    OrdinalOutOfOrder {
        axis: Axis,
        ordinal: usize,
        last: usize,
    },

    /// A track of the other axis was added.
    #[error("expected a {expected} track, got a {got} track")]
    AxisMismatch { expected: Axis, got: Axis },

    /// A range refers to tracks that do not exist.
    #[error("{axis} range {start}..{end} exceeds {len} tracks")]
    RangeOutOfBounds {
        axis: Axis,
        start: usize,
        end: usize,
        len: usize,
    },

    /// The row and block templates do not cover a gap-free run of tracks.
    #[error("repeat region along the {axis} axis has gaps")]
    DiscontiguousRegion { axis: Axis },

    /// A scalar binding overlaps the repeat region along the main axis.
    #[error("scalar '{name}' overlaps the repeat region")]
    ScalarInRepeatRegion { name: String },

    /// A repeated scalar lies outside the tracks its flow slots tile.
    #[error("repeated scalar '{name}' lies outside the flow region")]
    ScalarOutsideFlowRegion { name: String },
}

/// Errors from data source access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    /// Row ordinal out of range.
    #[error("row {ordinal} out of range ({len} rows)")]
    RowOutOfRange { ordinal: usize, len: usize },

    /// Column not part of the data source.
    #[error("unknown column {0:?}")]
    UnknownColumn(ColumnId),

    /// A value of the wrong kind was written to a column.
    #[error("column '{column}' expects {expected}, got {got}")]
    KindMismatch {
        column: String,
        expected: ValueKind,
        got: ValueKind,
    },

    /// A null was written to a non-nullable column.
    #[error("column '{column}' does not accept null")]
    NotNullable { column: String },

    /// Scalar not part of the store.
    #[error("unknown scalar")]
    UnknownScalar,

    /// A row was inserted with the wrong number of cells.
    #[error("row has {got} cells, expected {expected}")]
    ArityMismatch { expected: usize, got: usize },
}

/// Why an async validator run produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFault {
    /// The run observed its cancellation token.
    #[error("validation cancelled")]
    Cancelled,

    /// The validator failed.
    #[error("validation failed: {0}")]
    Failed(String),
}
