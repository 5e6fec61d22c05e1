//! Rows, columns and values consumed by the presenter.

mod dataset;
mod source;
mod value;

pub use dataset::{DataSet, DataSetBuilder};
pub use source::{Column, ColumnId, DataChange, DataSignals, DataSource, RowKey, RowSnapshot};
pub use value::{Value, ValueKind};
