use std::fmt;
use std::sync::Arc;

use super::{Binding, Input, error_ids};
use crate::data::{ColumnId, DataSource, RowSnapshot, Value};
use crate::grid::GridRange;
use crate::logging::targets;
use crate::validation::InputError;
use crate::view::ElementSpec;

type ComputeFn = Arc<dyn Fn(&RowSnapshot) -> Value + Send + Sync>;

/// Where a row binding reads from.
#[derive(Clone)]
pub enum RowSource {
    /// One column of the row. Writable when the binding has an input.
    Column(ColumnId),
    /// A value derived from the whole row. Never writable.
    Computed(ComputeFn),
}

impl fmt::Debug for RowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(c) => f.debug_tuple("Column").field(c).finish(),
            Self::Computed(_) => f.write_str("Computed"),
        }
    }
}

/// Binds an element to each materialized row.
#[derive(Debug, Clone)]
pub struct RowBinding {
    element: ElementSpec,
    range: GridRange,
    target: Arc<str>,
    source: RowSource,
    input: Option<Input>,
}

impl RowBinding {
    /// Show `column` in the `target` property.
    pub fn column(element: ElementSpec, range: GridRange, target: &str, column: ColumnId) -> Self {
        Self {
            element,
            range,
            target: target.into(),
            source: RowSource::Column(column),
            input: None,
        }
    }

    /// Show a value computed from the row.
    pub fn computed<F>(element: ElementSpec, range: GridRange, target: &str, compute: F) -> Self
    where
        F: Fn(&RowSnapshot) -> Value + Send + Sync + 'static,
    {
        Self {
            element,
            range,
            target: target.into(),
            source: RowSource::Computed(Arc::new(compute)),
            input: None,
        }
    }

    /// Accept edits of the target property.
    pub fn with_input(mut self, input: Input) -> Self {
        self.input = Some(input);
        self
    }

    pub fn source(&self) -> &RowSource {
        &self.source
    }

    pub fn input(&self) -> Option<&Input> {
        self.input.as_ref()
    }

    /// Whether a change of `column` can change the displayed value.
    pub fn depends_on(&self, column: ColumnId) -> bool {
        match &self.source {
            RowSource::Column(c) => *c == column,
            RowSource::Computed(_) => true,
        }
    }

    /// Current value for the row at `ordinal`.
    ///
    /// Read failures are logged and shown as `Null`.
    pub fn read(&self, data: &dyn DataSource, ordinal: usize) -> Value {
        let result = match &self.source {
            RowSource::Column(column) => data.cell(ordinal, *column),
            RowSource::Computed(compute) => data.snapshot(ordinal).map(|row| compute(&row)),
        };
        result.unwrap_or_else(|err| {
            tracing::warn!(target: targets::BINDING, ordinal, %err, "row binding read failed");
            Value::Null
        })
    }

    /// Convert `raw` and write it to the row at `ordinal`.
    ///
    /// Nothing is written when conversion or the data source rejects it.
    pub fn write(
        &self,
        data: &dyn DataSource,
        ordinal: usize,
        raw: &Value,
    ) -> Result<(), InputError> {
        let (RowSource::Column(column), Some(input)) = (&self.source, &self.input) else {
            return Err(InputError::new(
                error_ids::READ_ONLY,
                format!("'{}' does not accept input", self.target),
            ));
        };
        let kind = data
            .column(*column)
            .map(|c| c.kind())
            .ok_or_else(|| {
                InputError::new(error_ids::REJECTED, format!("unknown column {column:?}"))
            })?;
        let value = input.convert(raw, kind)?;
        data.set_cell(ordinal, *column, value)
            .map_err(|err| InputError::new(error_ids::REJECTED, err.to_string()))
    }
}

impl Binding for RowBinding {
    fn element(&self) -> &ElementSpec {
        &self.element
    }

    fn range(&self) -> &GridRange {
        &self.range
    }

    fn target(&self) -> &Arc<str> {
        &self.target
    }

    fn accepts_input(&self) -> bool {
        self.input.is_some() && matches!(self.source, RowSource::Column(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataSet, ValueKind};
    use crate::view::ElementKind;

    fn data() -> DataSet {
        let data = DataSet::builder()
            .required_column("name", ValueKind::Text)
            .column("age", ValueKind::Int)
            .build();
        data.push_row(vec![Value::from("ada"), Value::Int(36)]).unwrap();
        data
    }

    fn spec() -> ElementSpec {
        ElementSpec::simple(ElementKind("text"), "text")
    }

    #[test]
    fn test_read_column_and_computed() {
        let data = data();
        let age = RowBinding::column(spec(), GridRange::cell(1, 0), "text", ColumnId(1));
        assert_eq!(age.read(&data, 0), Value::Int(36));
        assert_eq!(age.read(&data, 9), Value::Null);

        let label = RowBinding::computed(spec(), GridRange::cell(0, 0), "text", |row| {
            Value::from(format!("{} ({})", row.get(ColumnId(0)), row.get(ColumnId(1))))
        });
        assert_eq!(label.read(&data, 0), Value::from("ada (36)"));
        assert!(label.depends_on(ColumnId(1)));
        assert!(!age.depends_on(ColumnId(0)));
    }

    #[test]
    fn test_write_converts_and_rejects() {
        let data = data();
        let age = RowBinding::column(spec(), GridRange::cell(1, 0), "text", ColumnId(1))
            .with_input(Input::new());
        age.write(&data, 0, &Value::from("40")).unwrap();
        assert_eq!(data.cell(0, ColumnId(1)), Ok(Value::Int(40)));

        let err = age.write(&data, 0, &Value::from("forty")).unwrap_err();
        assert_eq!(&*err.id, error_ids::CONVERSION);
        assert_eq!(data.cell(0, ColumnId(1)), Ok(Value::Int(40)));

        let name = RowBinding::column(spec(), GridRange::cell(0, 0), "text", ColumnId(0))
            .with_input(Input::new());
        let err = name.write(&data, 0, &Value::Null).unwrap_err();
        assert_eq!(&*err.id, error_ids::REJECTED);
        assert_eq!(data.cell(0, ColumnId(0)), Ok(Value::from("ada")));
    }

    #[test]
    fn test_write_without_input_is_read_only() {
        let data = data();
        let age = RowBinding::column(spec(), GridRange::cell(1, 0), "text", ColumnId(1));
        assert!(!age.accepts_input());
        let err = age.write(&data, 0, &Value::Int(1)).unwrap_err();
        assert_eq!(&*err.id, error_ids::READ_ONLY);
    }
}
