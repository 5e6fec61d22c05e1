//! Sealed, copy-on-write collections.
//!
//! Each collection starts unsealed, may be filled in place with
//! `insert_mut`, and is then [`seal`](ValidationDictionary::seal)ed. From then
//! on `add`/`remove` leave the receiver untouched and return a new sealed
//! instance sharing structure with it, so any instance handed out keeps the
//! content it was observed with.

use std::fmt;
use std::sync::Arc;

use im::{OrdMap, Vector};

use super::engine::AsyncValidator;
use super::message::{Severity, ValidationMessage};
use crate::data::RowKey;

fn assert_unsealed(sealed: bool, what: &str) {
    assert!(!sealed, "in-place insert into a sealed {what}");
}

/// An ordered group of messages for one row.
#[derive(Debug, Clone, Default)]
pub struct MessageGroup {
    messages: Vector<ValidationMessage>,
    sealed: bool,
}

impl MessageGroup {
    /// An empty, unsealed group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append in place.
    ///
    /// # Panics
    ///
    /// Panics if the group is sealed.
    pub fn insert_mut(&mut self, message: ValidationMessage) {
        assert_unsealed(self.sealed, "message group");
        self.messages.push_back(message);
    }

    /// Mark the group immutable.
    pub fn seal(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Whether the group is sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// A sealed copy with `message` appended.
    #[must_use]
    pub fn add(&self, message: ValidationMessage) -> Self {
        let mut messages = self.messages.clone();
        messages.push_back(message);
        Self {
            messages,
            sealed: true,
        }
    }

    /// A sealed copy without the messages whose id is `id`.
    #[must_use]
    pub fn remove(&self, id: &str) -> Self {
        Self {
            messages: self.messages.iter().filter(|m| &*m.id != id).cloned().collect(),
            sealed: true,
        }
    }

    /// A sealed copy with `other`'s messages appended.
    #[must_use]
    pub fn concat(&self, other: &MessageGroup) -> Self {
        let mut messages = self.messages.clone();
        messages.append(other.messages.clone());
        Self {
            messages,
            sealed: true,
        }
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Message at `index`.
    pub fn get(&self, index: usize) -> Option<&ValidationMessage> {
        self.messages.get(index)
    }

    /// Iterate over the messages in order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter()
    }

    /// Highest severity present.
    pub fn max_severity(&self) -> Option<Severity> {
        self.messages.iter().map(|m| m.severity).max()
    }

    /// Whether any message is an error.
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(ValidationMessage::is_error)
    }
}

impl PartialEq for MessageGroup {
    fn eq(&self, other: &Self) -> bool {
        self.messages == other.messages
    }
}

impl FromIterator<ValidationMessage> for MessageGroup {
    fn from_iter<I: IntoIterator<Item = ValidationMessage>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
            sealed: true,
        }
    }
}

/// Per-row validation results.
///
/// # Example
///
/// ```
/// use horizon_datagrid::data::RowKey;
/// use horizon_datagrid::validation::{MessageGroup, ValidationDictionary, ValidationMessage};
///
/// let empty = ValidationDictionary::new().seal();
/// let group: MessageGroup =
///     [ValidationMessage::error("qty.range", "too many")].into_iter().collect();
///
/// let with = empty.add(RowKey(1), group);
/// let without = with.remove(RowKey(1));
///
/// assert!(empty.is_empty());
/// assert_eq!(with.len(), 1);
/// assert_eq!(without, empty);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationDictionary {
    entries: OrdMap<RowKey, MessageGroup>,
    sealed: bool,
}

impl ValidationDictionary {
    /// An empty, unsealed dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace in place.
    ///
    /// # Panics
    ///
    /// Panics if the dictionary is sealed.
    pub fn insert_mut(&mut self, row: RowKey, messages: MessageGroup) {
        assert_unsealed(self.sealed, "validation dictionary");
        self.entries.insert(row, messages.seal());
    }

    /// Mark the dictionary immutable.
    pub fn seal(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Whether the dictionary is sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// A sealed copy in which `row` maps to `messages`, replacing any previous
    /// entry.
    #[must_use]
    pub fn add(&self, row: RowKey, messages: MessageGroup) -> Self {
        Self {
            entries: self.entries.update(row, messages.seal()),
            sealed: true,
        }
    }

    /// A sealed copy without `row`.
    #[must_use]
    pub fn remove(&self, row: RowKey) -> Self {
        Self {
            entries: self.entries.without(&row),
            sealed: true,
        }
    }

    /// Messages for `row`.
    pub fn get(&self, row: RowKey) -> Option<&MessageGroup> {
        self.entries.get(&row)
    }

    /// Whether `row` has an entry.
    pub fn contains(&self, row: RowKey) -> bool {
        self.entries.contains_key(&row)
    }

    /// Number of rows with entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no row has an entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &MessageGroup)> {
        self.entries.iter()
    }

    /// Rows with entries.
    pub fn rows(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.entries.keys().copied()
    }
}

impl PartialEq for ValidationDictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// The registered async validators, in registration order.
#[derive(Clone, Default)]
pub struct AsyncValidatorGroup {
    validators: Vector<Arc<dyn AsyncValidator>>,
    sealed: bool,
}

impl AsyncValidatorGroup {
    /// An empty, unsealed group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register in place.
    ///
    /// # Panics
    ///
    /// Panics if the group is sealed.
    pub fn insert_mut(&mut self, validator: Arc<dyn AsyncValidator>) {
        assert_unsealed(self.sealed, "async validator group");
        self.validators.push_back(validator);
    }

    /// Mark the group immutable.
    pub fn seal(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Whether the group is sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// A sealed copy with `validator` registered last.
    #[must_use]
    pub fn add(&self, validator: Arc<dyn AsyncValidator>) -> Self {
        let mut validators = self.validators.clone();
        validators.push_back(validator);
        Self {
            validators,
            sealed: true,
        }
    }

    /// A sealed copy without the validators named `name`.
    #[must_use]
    pub fn remove(&self, name: &str) -> Self {
        Self {
            validators: self
                .validators
                .iter()
                .filter(|v| v.name() != name)
                .cloned()
                .collect(),
            sealed: true,
        }
    }

    /// Number of validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether no validator is registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Validator at `index`.
    pub fn get(&self, index: usize) -> Option<&Arc<dyn AsyncValidator>> {
        self.validators.get(index)
    }

    /// Position of the validator named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.validators.iter().position(|v| v.name() == name)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AsyncValidator>> {
        self.validators.iter()
    }
}

impl PartialEq for AsyncValidatorGroup {
    fn eq(&self, other: &Self) -> bool {
        self.validators.len() == other.validators.len()
            && self
                .validators
                .iter()
                .zip(other.validators.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl fmt::Debug for AsyncValidatorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncValidatorGroup")
            .field(
                "validators",
                &self.validators.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .field("sealed", &self.sealed)
            .finish()
    }
}

static_assertions::assert_impl_all!(MessageGroup: Send, Sync);
static_assertions::assert_impl_all!(ValidationDictionary: Send, Sync);
static_assertions::assert_impl_all!(AsyncValidatorGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FnValidator;

    fn group(ids: &[&str]) -> MessageGroup {
        ids.iter()
            .map(|id| ValidationMessage::error(*id, "bad"))
            .collect()
    }

    #[test]
    fn test_dictionary_add_leaves_receiver_unchanged() {
        let base = ValidationDictionary::new().seal();
        let one = base.add(RowKey(1), group(&["a"]));
        let two = one.add(RowKey(1), group(&["b"]));

        assert!(base.is_empty());
        assert_eq!(one.get(RowKey(1)), Some(&group(&["a"])));
        assert_eq!(two.get(RowKey(1)), Some(&group(&["b"])));
        assert!(two.is_sealed());
    }

    #[test]
    fn test_dictionary_remove_missing_is_equal() {
        let base = ValidationDictionary::new().seal().add(RowKey(3), group(&["x"]));
        assert_eq!(base.remove(RowKey(4)), base);
        assert_eq!(base.rows().collect::<Vec<_>>(), vec![RowKey(3)]);
    }

    #[test]
    fn test_unsealed_insert_then_seal() {
        let mut dict = ValidationDictionary::new();
        dict.insert_mut(RowKey(1), group(&["a"]));
        let sealed = dict.seal();
        assert!(sealed.is_sealed());
        assert!(sealed.get(RowKey(1)).is_some_and(MessageGroup::is_sealed));
    }

    #[test]
    #[should_panic(expected = "sealed validation dictionary")]
    fn test_insert_into_sealed_panics() {
        let mut dict = ValidationDictionary::new().seal();
        dict.insert_mut(RowKey(1), MessageGroup::new());
    }

    #[test]
    fn test_message_group_ops() {
        let g = group(&["a", "b", "a"]);
        assert_eq!(g.remove("a").len(), 1);
        assert_eq!(g.len(), 3);
        let joined = group(&["x"]).concat(&group(&["y"]));
        assert_eq!(
            joined.iter().map(|m| &*m.id).collect::<Vec<_>>(),
            vec!["x", "y"]
        );
        assert_eq!(joined.max_severity(), Some(Severity::Error));
        assert!(MessageGroup::new().max_severity().is_none());
    }

    #[test]
    fn test_validator_group_order_and_remove() {
        let a: Arc<dyn AsyncValidator> = Arc::new(FnValidator::new("a", |_, _| Ok(Vec::new())));
        let b: Arc<dyn AsyncValidator> = Arc::new(FnValidator::new("b", |_, _| Ok(Vec::new())));
        let empty = AsyncValidatorGroup::new().seal();
        let both = empty.add(a.clone()).add(b.clone());
        assert_eq!(both.position("b"), Some(1));
        assert_eq!(both.remove("a").len(), 1);
        assert_eq!(both.len(), 2);
        assert!(empty.is_empty());
        assert_eq!(both.remove("a"), empty.add(b));
    }

    #[test]
    #[should_panic(expected = "sealed async validator group")]
    fn test_validator_group_insert_into_sealed_panics() {
        let mut g = AsyncValidatorGroup::new().seal();
        g.insert_mut(Arc::new(FnValidator::new("a", |_, _| Ok(Vec::new()))));
    }
}
