//! Input validation and asynchronous row validation.
//!
//! Two kinds of problems are tracked separately:
//!
//! - **Input errors** ([`InputError`]) come from a failed reverse update of a
//!   single binding and live on the presenter that owns the binding.
//! - **Validation messages** ([`ValidationMessage`]) come from
//!   [`AsyncValidator`]s and are kept per row in sealed
//!   [`ValidationDictionary`]s by the [`ValidationEngine`].

mod engine;
mod local;
mod message;
mod sealed;

pub use engine::{AsyncValidator, FnValidator, RunToken, ValidationEngine, ValidatorStatus};
pub(crate) use engine::RunResult;
pub use local::{
    CustomValidator, DoubleValidator, IntValidator, RegexValidator, ValidationState, Validator,
};
pub use message::{
    InputError, MessageKind, MessageSource, ReverseBindingError, Severity, ValidationMessage,
};
pub use sealed::{AsyncValidatorGroup, MessageGroup, ValidationDictionary};
