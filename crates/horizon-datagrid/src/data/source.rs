//! The data source contract consumed by the presenter.

use std::fmt;
use std::sync::Arc;

use horizon_datagrid_core::Signal;

use super::value::{Value, ValueKind};
use crate::error::DataError;

/// Identifies a column by its position in the source's column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub usize);

impl ColumnId {
    /// The column's position.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable identity of a data row.
///
/// Keys are assigned when a row is inserted and are never reused, so they
/// remain valid across inserts and removals of other rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(pub u64);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    id: ColumnId,
    name: Arc<str>,
    kind: ValueKind,
    nullable: bool,
}

impl Column {
    /// Create a column. Columns are nullable unless [`required`](Self::required)
    /// is called.
    pub fn new(id: ColumnId, name: impl Into<Arc<str>>, kind: ValueKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            nullable: true,
        }
    }

    /// Reject `Null` writes.
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// The column's id.
    pub fn id(&self) -> ColumnId {
        self.id
    }

    /// The column's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of value the column stores.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether `Null` is accepted.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Check that `value` may be stored in this column.
    pub fn check(&self, value: &Value) -> Result<(), DataError> {
        match value.kind() {
            ValueKind::Null if self.nullable => Ok(()),
            ValueKind::Null => Err(DataError::NotNullable {
                column: self.name.to_string(),
            }),
            kind if kind == self.kind => Ok(()),
            got => Err(DataError::KindMismatch {
                column: self.name.to_string(),
                expected: self.kind,
                got,
            }),
        }
    }
}

/// A change announced by a data source.
#[derive(Debug, Clone, PartialEq)]
pub enum DataChange {
    /// The rows with `keys` were inserted; the first is at `ordinal`.
    RowsInserted { ordinal: usize, keys: Vec<RowKey> },
    /// The rows with `keys` were removed; the first was at `ordinal`.
    RowsRemoved { ordinal: usize, keys: Vec<RowKey> },
    /// A single cell changed.
    CellChanged { key: RowKey, column: ColumnId },
    /// Everything changed.
    Reset,
}

/// Signals emitted by a data source.
#[derive(Debug, Default)]
pub struct DataSignals {
    /// Emitted after every structural or cell change. Shared so observers
    /// can hold scoped connections.
    pub changed: Arc<Signal<DataChange>>,
}

impl DataSignals {
    /// Create a new set of signals.
    pub fn new() -> Self {
        Self::default()
    }
}

/// An owned copy of one row, safe to hand to a worker thread.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSnapshot {
    key: RowKey,
    ordinal: usize,
    columns: Arc<[Column]>,
    cells: Vec<Value>,
}

impl RowSnapshot {
    /// Assemble a snapshot. `cells` is indexed by column position.
    pub fn new(key: RowKey, ordinal: usize, columns: Arc<[Column]>, cells: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), cells.len());
        Self {
            key,
            ordinal,
            columns,
            cells,
        }
    }

    /// The row's key.
    pub fn key(&self) -> RowKey {
        self.key
    }

    /// The row's ordinal when the snapshot was taken.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The source's columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The value of a column. Unknown columns read as `Null`.
    pub fn get(&self, column: ColumnId) -> &Value {
        self.cells.get(column.index()).unwrap_or(&Value::Null)
    }

    /// The value of a column looked up by name.
    pub fn by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .map(|i| &self.cells[i])
    }
}

/// A source of rows with typed columns.
///
/// The presenter reads and writes cells through this trait and listens to
/// [`signals`](Self::signals) for structural changes. Implementations use
/// interior mutability so that the host and the presenter can share one
/// source behind an `Arc`.
pub trait DataSource: Send + Sync {
    /// All columns, indexed by [`ColumnId`].
    fn columns(&self) -> &[Column];

    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Key of the row at `ordinal`.
    fn row_key(&self, ordinal: usize) -> Option<RowKey>;

    /// Current ordinal of the row with `key`.
    fn ordinal_of(&self, key: RowKey) -> Option<usize>;

    /// Read one cell.
    fn cell(&self, ordinal: usize, column: ColumnId) -> Result<Value, DataError>;

    /// Write one cell. The value must satisfy [`Column::check`].
    fn set_cell(&self, ordinal: usize, column: ColumnId, value: Value) -> Result<(), DataError>;

    /// Change notifications.
    fn signals(&self) -> &DataSignals;

    /// Look up a column.
    fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns().get(id.index())
    }

    /// Look up a column by name.
    fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns().iter().find(|c| c.name() == name)
    }

    /// Copy out the row at `ordinal`.
    fn snapshot(&self, ordinal: usize) -> Result<RowSnapshot, DataError> {
        let key = self.row_key(ordinal).ok_or(DataError::RowOutOfRange {
            ordinal,
            len: self.row_count(),
        })?;
        let cells = self
            .columns()
            .iter()
            .map(|c| self.cell(ordinal, c.id()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RowSnapshot::new(key, ordinal, self.columns().into(), cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_check() {
        let col = Column::new(ColumnId(0), "age", ValueKind::Int).required();
        assert!(col.check(&Value::Int(3)).is_ok());
        assert_eq!(
            col.check(&Value::Null),
            Err(DataError::NotNullable {
                column: "age".into()
            })
        );
        assert!(matches!(
            col.check(&Value::Text("x".into())),
            Err(DataError::KindMismatch { .. })
        ));
        let nullable = Column::new(ColumnId(1), "note", ValueKind::Text);
        assert!(nullable.check(&Value::Null).is_ok());
    }

    #[test]
    fn test_snapshot_lookup() {
        let columns: Arc<[Column]> = vec![
            Column::new(ColumnId(0), "a", ValueKind::Int),
            Column::new(ColumnId(1), "b", ValueKind::Text),
        ]
        .into();
        let snap = RowSnapshot::new(
            RowKey(7),
            2,
            columns,
            vec![Value::Int(1), Value::from("x")],
        );
        assert_eq!(snap.get(ColumnId(1)), &Value::from("x"));
        assert_eq!(snap.get(ColumnId(9)), &Value::Null);
        assert_eq!(snap.by_name("a"), Some(&Value::Int(1)));
        assert_eq!(snap.key(), RowKey(7));
    }
}
