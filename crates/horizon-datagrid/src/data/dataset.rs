//! In-memory data source.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::source::{Column, ColumnId, DataChange, DataSignals, DataSource, RowKey, RowSnapshot};
use super::value::{Value, ValueKind};
use crate::error::DataError;
use crate::logging::targets;

struct Row {
    key: RowKey,
    cells: Vec<Value>,
}

/// Rows in order plus a key to ordinal index.
#[derive(Default)]
struct Table {
    rows: Vec<Row>,
    index: HashMap<RowKey, usize>,
}

impl Table {
    fn insert(&mut self, ordinal: usize, row: Row) {
        self.rows.insert(ordinal, row);
        self.reindex_from(ordinal);
    }

    fn remove(&mut self, ordinal: usize) -> Row {
        let row = self.rows.remove(ordinal);
        self.index.remove(&row.key);
        self.reindex_from(ordinal);
        row
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.index.clear();
    }

    fn reindex_from(&mut self, ordinal: usize) {
        for (offset, row) in self.rows[ordinal..].iter().enumerate() {
            self.index.insert(row.key, ordinal + offset);
        }
    }
}

/// A table of rows held in memory.
///
/// Every mutation emits a [`DataChange`] on [`DataSource::signals`] after the
/// rows lock has been released, so slots may read the data set.
///
/// # Example
///
/// ```
/// use horizon_datagrid::data::{DataSet, DataSource, Value, ValueKind};
///
/// let data = DataSet::builder()
///     .column("name", ValueKind::Text)
///     .required_column("qty", ValueKind::Int)
///     .build();
/// let key = data.push_row(vec!["apples".into(), 3.into()]).unwrap();
///
/// assert_eq!(data.row_count(), 1);
/// assert_eq!(data.ordinal_of(key), Some(0));
/// assert!(data.set_cell(0, data.column_by_name("qty").unwrap().id(), Value::Null).is_err());
/// ```
pub struct DataSet {
    columns: Arc<[Column]>,
    table: RwLock<Table>,
    next_key: AtomicU64,
    signals: DataSignals,
}

impl DataSet {
    /// Create an empty data set with the given columns.
    ///
    /// Column ids are reassigned to match their position.
    pub fn new(columns: Vec<Column>) -> Self {
        let columns: Vec<Column> = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let nullable = c.is_nullable();
                let col = Column::new(ColumnId(i), c.name().to_string(), c.kind());
                if nullable { col } else { col.required() }
            })
            .collect();
        Self {
            columns: columns.into(),
            table: RwLock::new(Table::default()),
            next_key: AtomicU64::new(1),
            signals: DataSignals::new(),
        }
    }

    /// Start describing columns.
    pub fn builder() -> DataSetBuilder {
        DataSetBuilder::default()
    }

    fn check_row(&self, cells: &[Value]) -> Result<(), DataError> {
        if cells.len() != self.columns.len() {
            return Err(DataError::ArityMismatch {
                expected: self.columns.len(),
                got: cells.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(cells) {
            column.check(value)?;
        }
        Ok(())
    }

    fn allocate_key(&self) -> RowKey {
        RowKey(self.next_key.fetch_add(1, Ordering::Relaxed))
    }

    /// Append a row.
    pub fn push_row(&self, cells: Vec<Value>) -> Result<RowKey, DataError> {
        let ordinal = self.table.read().rows.len();
        self.insert_row(ordinal, cells)
    }

    /// Insert a row at `ordinal`.
    pub fn insert_row(&self, ordinal: usize, cells: Vec<Value>) -> Result<RowKey, DataError> {
        self.check_row(&cells)?;
        let key = self.allocate_key();
        {
            let mut table = self.table.write();
            if ordinal > table.rows.len() {
                return Err(DataError::RowOutOfRange {
                    ordinal,
                    len: table.rows.len(),
                });
            }
            table.insert(ordinal, Row { key, cells });
        }
        tracing::trace!(target: targets::DATA, %key, ordinal, "row inserted");
        self.signals.changed.emit(DataChange::RowsInserted {
            ordinal,
            keys: vec![key],
        });
        Ok(key)
    }

    /// Remove the row at `ordinal`, returning its key.
    pub fn remove_row(&self, ordinal: usize) -> Result<RowKey, DataError> {
        let key = {
            let mut table = self.table.write();
            if ordinal >= table.rows.len() {
                return Err(DataError::RowOutOfRange {
                    ordinal,
                    len: table.rows.len(),
                });
            }
            table.remove(ordinal).key
        };
        tracing::trace!(target: targets::DATA, %key, ordinal, "row removed");
        self.signals.changed.emit(DataChange::RowsRemoved {
            ordinal,
            keys: vec![key],
        });
        Ok(key)
    }

    /// Remove every row.
    pub fn clear(&self) {
        self.table.write().clear();
        self.signals.changed.emit(DataChange::Reset);
    }
}

impl DataSource for DataSet {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn row_count(&self) -> usize {
        self.table.read().rows.len()
    }

    fn row_key(&self, ordinal: usize) -> Option<RowKey> {
        self.table.read().rows.get(ordinal).map(|r| r.key)
    }

    fn ordinal_of(&self, key: RowKey) -> Option<usize> {
        self.table.read().index.get(&key).copied()
    }

    fn cell(&self, ordinal: usize, column: ColumnId) -> Result<Value, DataError> {
        let table = self.table.read();
        let row = table.rows.get(ordinal).ok_or(DataError::RowOutOfRange {
            ordinal,
            len: table.rows.len(),
        })?;
        row.cells
            .get(column.index())
            .cloned()
            .ok_or(DataError::UnknownColumn(column))
    }

    fn set_cell(&self, ordinal: usize, column: ColumnId, value: Value) -> Result<(), DataError> {
        let col = self
            .columns
            .get(column.index())
            .ok_or(DataError::UnknownColumn(column))?;
        col.check(&value)?;
        let key = {
            let mut table = self.table.write();
            let len = table.rows.len();
            let row = table
                .rows
                .get_mut(ordinal)
                .ok_or(DataError::RowOutOfRange { ordinal, len })?;
            if row.cells[column.index()] == value {
                return Ok(());
            }
            row.cells[column.index()] = value;
            row.key
        };
        self.signals
            .changed
            .emit(DataChange::CellChanged { key, column });
        Ok(())
    }

    fn signals(&self) -> &DataSignals {
        &self.signals
    }

    fn snapshot(&self, ordinal: usize) -> Result<RowSnapshot, DataError> {
        let table = self.table.read();
        let row = table.rows.get(ordinal).ok_or(DataError::RowOutOfRange {
            ordinal,
            len: table.rows.len(),
        })?;
        Ok(RowSnapshot::new(
            row.key,
            ordinal,
            self.columns.clone(),
            row.cells.clone(),
        ))
    }
}

impl std::fmt::Debug for DataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSet")
            .field("columns", &self.columns.len())
            .field("rows", &self.table.read().rows.len())
            .finish()
    }
}

/// Builder for [`DataSet`] columns.
#[derive(Debug, Default)]
pub struct DataSetBuilder {
    columns: Vec<Column>,
}

impl DataSetBuilder {
    /// Add a nullable column.
    pub fn column(mut self, name: &str, kind: ValueKind) -> Self {
        self.columns
            .push(Column::new(ColumnId(self.columns.len()), name, kind));
        self
    }

    /// Add a column that rejects `Null`.
    pub fn required_column(mut self, name: &str, kind: ValueKind) -> Self {
        self.columns
            .push(Column::new(ColumnId(self.columns.len()), name, kind).required());
        self
    }

    /// Build the empty data set.
    pub fn build(self) -> DataSet {
        DataSet::new(self.columns)
    }
}

static_assertions::assert_impl_all!(DataSet: Send, Sync);
