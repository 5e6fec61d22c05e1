//! The reverse (view to data) half of a binding.

use std::fmt;
use std::sync::Arc;

use crate::data::{Value, ValueKind};
use crate::validation::{InputError, Validator};

/// Stable ids of the input errors raised by the engine.
pub mod error_ids {
    /// Rejected by the input's [`Validator`](crate::validation::Validator).
    pub const INVALID: &str = "input.invalid";
    /// Could not be converted to the target kind.
    pub const CONVERSION: &str = "input.conversion";
    /// Rejected by the data source or scalar store.
    pub const REJECTED: &str = "input.rejected";
    /// The binding has no writable source.
    pub const READ_ONLY: &str = "input.read_only";
}

type ConvertFn = Arc<dyn Fn(&Value, ValueKind) -> Result<Value, InputError> + Send + Sync>;

/// Turns an edited value into a value for the bound source.
///
/// Text edits are first checked by the optional [`Validator`] (with fixup),
/// then converted to the source's kind, either by the custom converter or
/// by [`convert_to_kind`].
///
/// # Example
///
/// ```
/// use horizon_datagrid::binding::Input;
/// use horizon_datagrid::data::{Value, ValueKind};
/// use horizon_datagrid::validation::IntValidator;
///
/// let input = Input::new().with_validator(IntValidator::new(0, 10));
/// assert_eq!(input.convert(&Value::from("7"), ValueKind::Int), Ok(Value::Int(7)));
/// assert_eq!(input.convert(&Value::from("70"), ValueKind::Int), Ok(Value::Int(10)));
/// assert!(input.convert(&Value::from("x"), ValueKind::Int).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Input {
    validator: Option<Arc<dyn Validator>>,
    converter: Option<ConvertFn>,
}

impl Input {
    /// An input with default conversion and no validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check text edits with `validator`.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Replace the default conversion.
    pub fn with_converter<F>(mut self, converter: F) -> Self
    where
        F: Fn(&Value, ValueKind) -> Result<Value, InputError> + Send + Sync + 'static,
    {
        self.converter = Some(Arc::new(converter));
        self
    }

    /// Validate and convert `raw` for a source of `kind`.
    pub fn convert(&self, raw: &Value, kind: ValueKind) -> Result<Value, InputError> {
        let checked = match (raw, &self.validator) {
            (Value::Text(text), Some(validator)) => match validator.check(text) {
                Ok(fixed) => Value::Text(fixed),
                Err(state) => {
                    return Err(InputError::new(
                        error_ids::INVALID,
                        format!("'{text}' is {state}"),
                    ));
                }
            },
            _ => raw.clone(),
        };
        match &self.converter {
            Some(convert) => convert(&checked, kind),
            None => convert_to_kind(&checked, kind),
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("validator", &self.validator.is_some())
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

/// Default conversion: parse text, widen integers to floats, format
/// anything as text. `Null` passes through for the source to accept or
/// reject.
pub fn convert_to_kind(raw: &Value, kind: ValueKind) -> Result<Value, InputError> {
    if raw.is_null() || raw.kind() == kind {
        return Ok(raw.clone());
    }
    match (raw, kind) {
        (Value::Int(n), ValueKind::Float) => Ok(Value::Float(*n as f64)),
        (Value::Text(text), kind) => Value::parse(text, kind).ok_or_else(|| {
            InputError::new(
                error_ids::CONVERSION,
                format!("'{text}' is not a valid {kind}"),
            )
        }),
        (value, ValueKind::Text) => Ok(Value::Text(value.to_string())),
        (value, kind) => Err(InputError::new(
            error_ids::CONVERSION,
            format!("cannot convert {} to {kind}", value.kind()),
        )),
    }
}
