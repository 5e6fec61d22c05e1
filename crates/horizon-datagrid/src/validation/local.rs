//! Synchronous validators for edited text.
//!
//! An [`Input`](crate::binding::Input) may carry one of these. When a user
//! edit arrives as text it is checked before conversion; anything short of
//! [`ValidationState::Acceptable`], even after [`Validator::fixup`], becomes
//! an input error and the data is left untouched.
//!
//! # Example
//!
//! ```
//! use horizon_datagrid::validation::{IntValidator, ValidationState, Validator};
//!
//! let v = IntValidator::new(0, 100);
//! assert_eq!(v.validate("42"), ValidationState::Acceptable);
//! assert_eq!(v.validate("-"), ValidationState::Invalid);
//! assert_eq!(v.fixup("150").as_deref(), Some("100"));
//! ```

use std::fmt;
use std::sync::Arc;

/// The result of validating edited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationState {
    /// The text is wrong and further editing cannot fix it.
    Invalid,
    /// The text is incomplete.
    Intermediate,
    /// The text is a valid final value.
    #[default]
    Acceptable,
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationState::Invalid => write!(f, "invalid"),
            ValidationState::Intermediate => write!(f, "incomplete"),
            ValidationState::Acceptable => write!(f, "acceptable"),
        }
    }
}

/// Checks edited text.
pub trait Validator: Send + Sync {
    /// Classify `input`.
    fn validate(&self, input: &str) -> ValidationState;

    /// Try to turn unacceptable input into acceptable input.
    fn fixup(&self, _input: &str) -> Option<String> {
        None
    }

    /// Validate, applying [`fixup`](Self::fixup) once if needed.
    ///
    /// Returns the text to commit, or the state that rejected it.
    fn check(&self, input: &str) -> Result<String, ValidationState> {
        match self.validate(input) {
            ValidationState::Acceptable => Ok(input.to_string()),
            state => match self.fixup(input) {
                Some(fixed) if self.validate(&fixed) == ValidationState::Acceptable => Ok(fixed),
                _ => Err(state),
            },
        }
    }
}

impl<V: Validator + ?Sized> Validator for Arc<V> {
    fn validate(&self, input: &str) -> ValidationState {
        (**self).validate(input)
    }

    fn fixup(&self, input: &str) -> Option<String> {
        (**self).fixup(input)
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn validate(&self, input: &str) -> ValidationState {
        (**self).validate(input)
    }

    fn fixup(&self, input: &str) -> Option<String> {
        (**self).fixup(input)
    }
}

/// Integers within `[minimum, maximum]`.
///
/// Fixup clamps out-of-range numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntValidator {
    minimum: i64,
    maximum: i64,
}

impl IntValidator {
    /// Accept integers in `[minimum, maximum]`; the bounds are swapped if
    /// given in the wrong order.
    pub fn new(minimum: i64, maximum: i64) -> Self {
        Self {
            minimum: minimum.min(maximum),
            maximum: minimum.max(maximum),
        }
    }

    /// Accept zero and above.
    pub fn non_negative() -> Self {
        Self::new(0, i64::MAX)
    }

    /// The lower bound.
    pub fn minimum(&self) -> i64 {
        self.minimum
    }

    /// The upper bound.
    pub fn maximum(&self) -> i64 {
        self.maximum
    }
}

impl Validator for IntValidator {
    fn validate(&self, input: &str) -> ValidationState {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "+" {
            return ValidationState::Intermediate;
        }
        if trimmed == "-" {
            return if self.minimum < 0 {
                ValidationState::Intermediate
            } else {
                ValidationState::Invalid
            };
        }

        let well_formed = trimmed
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')));
        if !well_formed {
            return ValidationState::Invalid;
        }

        match trimmed.parse::<i64>() {
            Ok(value) if (self.minimum..=self.maximum).contains(&value) => {
                ValidationState::Acceptable
            }
            // A short positive number below a positive minimum may still grow
            // into range.
            Ok(value)
                if value >= 0
                    && value < self.minimum
                    && value.to_string().len() < self.maximum.to_string().len() =>
            {
                ValidationState::Intermediate
            }
            _ => ValidationState::Invalid,
        }
    }

    fn fixup(&self, input: &str) -> Option<String> {
        let value = input.trim().parse::<i64>().ok()?;
        let clamped = value.clamp(self.minimum, self.maximum);
        (clamped != value).then(|| clamped.to_string())
    }
}

/// Decimals within `[minimum, maximum]` with at most `decimals` fraction
/// digits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleValidator {
    minimum: f64,
    maximum: f64,
    decimals: u32,
}

impl DoubleValidator {
    /// Accept decimals in `[minimum, maximum]` with up to `decimals`
    /// fraction digits.
    pub fn new(minimum: f64, maximum: f64, decimals: u32) -> Self {
        Self {
            minimum: minimum.min(maximum),
            maximum: minimum.max(maximum),
            decimals,
        }
    }

    /// Accept zero and above.
    pub fn non_negative(decimals: u32) -> Self {
        Self::new(0.0, f64::MAX, decimals)
    }

    /// The lower bound.
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// The upper bound.
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Maximum fraction digits.
    pub fn decimals(&self) -> u32 {
        self.decimals
    }
}

impl Validator for DoubleValidator {
    fn validate(&self, input: &str) -> ValidationState {
        let trimmed = input.trim();
        if matches!(trimmed, "" | "+" | "." | "+.") {
            return ValidationState::Intermediate;
        }
        if matches!(trimmed, "-" | "-.") {
            return if self.minimum < 0.0 {
                ValidationState::Intermediate
            } else {
                ValidationState::Invalid
            };
        }

        let mut dots = 0;
        let mut digits = 0;
        for (i, c) in trimmed.chars().enumerate() {
            match c {
                '0'..='9' => digits += 1,
                '.' => dots += 1,
                '-' | '+' if i == 0 => {}
                _ => return ValidationState::Invalid,
            }
        }
        if dots > 1 || digits == 0 {
            return ValidationState::Invalid;
        }
        if let Some((_, fraction)) = trimmed.split_once('.')
            && fraction.len() > self.decimals as usize
        {
            return ValidationState::Invalid;
        }
        if trimmed.ends_with('.') {
            return ValidationState::Intermediate;
        }

        match trimmed.parse::<f64>() {
            Ok(value) if !value.is_finite() => ValidationState::Invalid,
            Ok(value) if value >= self.minimum && value <= self.maximum => {
                ValidationState::Acceptable
            }
            Ok(value) if self.minimum >= 0.0 && value >= 0.0 && value < self.minimum => {
                ValidationState::Intermediate
            }
            _ => ValidationState::Invalid,
        }
    }

    fn fixup(&self, input: &str) -> Option<String> {
        let trimmed = input.trim();
        let value = trimmed.trim_end_matches('.').parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        let clamped = value.clamp(self.minimum, self.maximum);
        if clamped != value || trimmed.ends_with('.') {
            Some(format!("{:.prec$}", clamped, prec = self.decimals as usize))
        } else {
            None
        }
    }
}

/// Text matching a regular expression.
///
/// Without an intermediate pattern, non-matching text is
/// [`Invalid`](ValidationState::Invalid); with one, text matching only the
/// intermediate pattern is [`Intermediate`](ValidationState::Intermediate).
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: regex::Regex,
    intermediate: Option<regex::Regex>,
}

impl RegexValidator {
    /// Accept text matching `pattern`.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: regex::Regex::new(pattern)?,
            intermediate: None,
        })
    }

    /// Accept text matching `pattern`; treat text matching `intermediate` as
    /// incomplete.
    pub fn with_intermediate(pattern: &str, intermediate: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: regex::Regex::new(pattern)?,
            intermediate: Some(regex::Regex::new(intermediate)?),
        })
    }

    /// The acceptance pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Validator for RegexValidator {
    fn validate(&self, input: &str) -> ValidationState {
        if self.pattern.is_match(input) {
            ValidationState::Acceptable
        } else if input.is_empty()
            || self.intermediate.as_ref().is_some_and(|re| re.is_match(input))
        {
            ValidationState::Intermediate
        } else {
            ValidationState::Invalid
        }
    }
}

type FixupFn = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A validator built from closures.
pub struct CustomValidator<F>
where
    F: Fn(&str) -> ValidationState + Send + Sync,
{
    validate_fn: F,
    fixup_fn: Option<FixupFn>,
}

impl<F> CustomValidator<F>
where
    F: Fn(&str) -> ValidationState + Send + Sync,
{
    /// Validate with `validate_fn`.
    pub fn new(validate_fn: F) -> Self {
        Self {
            validate_fn,
            fixup_fn: None,
        }
    }

    /// Add a fixup function.
    pub fn with_fixup<G>(mut self, fixup_fn: G) -> Self
    where
        G: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.fixup_fn = Some(Box::new(fixup_fn));
        self
    }
}

impl<F> Validator for CustomValidator<F>
where
    F: Fn(&str) -> ValidationState + Send + Sync,
{
    fn validate(&self, input: &str) -> ValidationState {
        (self.validate_fn)(input)
    }

    fn fixup(&self, input: &str) -> Option<String> {
        self.fixup_fn.as_ref().and_then(|f| f(input))
    }
}

impl<F> fmt::Debug for CustomValidator<F>
where
    F: Fn(&str) -> ValidationState + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidator")
            .field("has_fixup", &self.fixup_fn.is_some())
            .finish()
    }
}
