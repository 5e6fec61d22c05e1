//! Validation messages and input errors.

use std::fmt;
use std::sync::Arc;

use crate::binding::ScalarId;
use crate::data::ColumnId;
use crate::elements::ElementId;

/// How serious a message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Informational.
    Info,
    /// Suspicious but acceptable.
    Warning,
    /// Must be fixed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// A failed reverse update of a row binding.
    RowInput,
    /// A failed reverse update of a scalar binding.
    ScalarInput,
    /// A validator result.
    Validation,
}

/// What a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSource {
    /// A view element, for input errors.
    Element(ElementId),
    /// A data column.
    Column(ColumnId),
    /// A scalar value.
    Scalar(ScalarId),
}

/// An immutable validation record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationMessage {
    /// Stable identifier, suitable for localization or test matching.
    pub id: Arc<str>,
    /// Severity.
    pub severity: Severity,
    /// Human-readable text.
    pub description: String,
    /// Message category.
    pub kind: MessageKind,
    /// What the message is about, if known.
    pub source: Option<MessageSource>,
}

impl ValidationMessage {
    /// A validator message with no source.
    pub fn new(
        id: impl Into<Arc<str>>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            description: description.into(),
            kind: MessageKind::Validation,
            source: None,
        }
    }

    /// Shorthand for an error-severity validator message.
    pub fn error(id: impl Into<Arc<str>>, description: impl Into<String>) -> Self {
        Self::new(id, Severity::Error, description)
    }

    /// Shorthand for a warning-severity validator message.
    pub fn warning(id: impl Into<Arc<str>>, description: impl Into<String>) -> Self {
        Self::new(id, Severity::Warning, description)
    }

    /// Attach a source.
    pub fn with_source(mut self, source: MessageSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Whether this is an error-severity message.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.id, self.description)
    }
}

/// The outcome of a failed reverse update: a stable id plus a description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputError {
    /// Stable identifier.
    pub id: Arc<str>,
    /// Human-readable text.
    pub description: String,
}

/// The raw error of a reverse binding before it is tied to an element.
pub type ReverseBindingError = InputError;

impl InputError {
    /// Create an input error.
    pub fn new(id: impl Into<Arc<str>>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }

    /// Surface the error as an error-severity message of `kind`.
    pub fn to_message(
        &self,
        kind: MessageKind,
        source: Option<MessageSource>,
    ) -> ValidationMessage {
        ValidationMessage {
            id: self.id.clone(),
            severity: Severity::Error,
            description: self.description.clone(),
            kind,
            source,
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.description)
    }
}

impl std::error::Error for InputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_surfaces_as_error() {
        let err = InputError::new("input.invalid", "not a number");
        let msg = err.to_message(MessageKind::RowInput, Some(MessageSource::Column(ColumnId(2))));
        assert_eq!(msg.severity, Severity::Error);
        assert_eq!(msg.kind, MessageKind::RowInput);
        assert_eq!(&*msg.id, "input.invalid");
        assert_eq!(err.to_string(), "[input.invalid] not a number");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
