use std::fmt;
use std::sync::Arc;

use horizon_datagrid_core::Signal;
use slotmap::{SlotMap, new_key_type};

use super::{Binding, Input, error_ids};
use crate::error::DataError;
use crate::data::{Value, ValueKind};
use crate::flow::FlowMode;
use crate::grid::GridRange;
use crate::validation::InputError;
use crate::view::ElementSpec;

new_key_type! {
    /// Identifies a scalar in a [`ScalarStore`].
    pub struct ScalarId;
}

type ValueRule = Arc<dyn Fn(&Value) -> Option<InputError> + Send + Sync>;

struct ScalarEntry {
    name: Arc<str>,
    kind: ValueKind,
    value: Value,
    rule: Option<ValueRule>,
}

/// Values shown outside the repeated rows: totals, filters, headers.
///
/// Each scalar has a fixed kind and an optional rule that reports whether
/// the current value is acceptable. The rule's verdict is the scalar's
/// *value error*, shown next to the scalar's elements.
#[derive(Default)]
pub struct ScalarStore {
    entries: SlotMap<ScalarId, ScalarEntry>,
    changed: Signal<ScalarId>,
}

impl ScalarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar whose kind is taken from `value` (`Null` means text).
    pub fn insert(&mut self, name: &str, value: Value) -> ScalarId {
        let kind = match value.kind() {
            ValueKind::Null => ValueKind::Text,
            kind => kind,
        };
        self.insert_typed(name, kind, value)
    }

    /// Add a scalar of `kind`.
    pub fn insert_typed(&mut self, name: &str, kind: ValueKind, value: Value) -> ScalarId {
        self.entries.insert(ScalarEntry {
            name: name.into(),
            kind,
            value,
            rule: None,
        })
    }

    /// Attach a value rule. Returns `false` for unknown scalars.
    pub fn set_rule<F>(&mut self, id: ScalarId, rule: F) -> bool
    where
        F: Fn(&Value) -> Option<InputError> + Send + Sync + 'static,
    {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.rule = Some(Arc::new(rule));
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ScalarId) -> Option<&Value> {
        self.entries.get(id).map(|e| &e.value)
    }

    pub fn name(&self, id: ScalarId) -> Option<&str> {
        self.entries.get(id).map(|e| &*e.name)
    }

    pub fn kind(&self, id: ScalarId) -> Option<ValueKind> {
        self.entries.get(id).map(|e| e.kind)
    }

    pub fn by_name(&self, name: &str) -> Option<ScalarId> {
        self.entries.iter().find(|(_, e)| &*e.name == name).map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a new value.
    ///
    /// Returns whether the value changed; [`changed`](Self::changed) fires
    /// only then.
    pub fn set(&mut self, id: ScalarId, value: Value) -> Result<bool, DataError> {
        let entry = self.entries.get_mut(id).ok_or(DataError::UnknownScalar)?;
        if !value.is_null() && value.kind() != entry.kind {
            return Err(DataError::KindMismatch {
                column: entry.name.to_string(),
                expected: entry.kind,
                got: value.kind(),
            });
        }
        if entry.value == value {
            return Ok(false);
        }
        entry.value = value;
        self.changed.emit(id);
        Ok(true)
    }

    /// The rule's verdict on the current value.
    pub fn value_error(&self, id: ScalarId) -> Option<InputError> {
        let entry = self.entries.get(id)?;
        entry.rule.as_ref().and_then(|rule| rule(&entry.value))
    }

    /// Emitted after a scalar value changed.
    pub fn changed(&self) -> &Signal<ScalarId> {
        &self.changed
    }
}

impl fmt::Debug for ScalarStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.values().map(|e| (&e.name, &e.value)))
            .finish()
    }
}

/// Binds an element to a scalar.
///
/// In [`FlowMode::Repeat`] the element is repeated once per flow slot; in
/// [`FlowMode::Stretch`] a single element spans every slot.
#[derive(Debug, Clone)]
pub struct ScalarBinding {
    element: ElementSpec,
    range: GridRange,
    target: Arc<str>,
    scalar: ScalarId,
    mode: FlowMode,
    input: Option<Input>,
}

impl ScalarBinding {
    pub fn new(element: ElementSpec, range: GridRange, target: &str, scalar: ScalarId) -> Self {
        Self {
            element,
            range,
            target: target.into(),
            scalar,
            mode: FlowMode::Repeat,
            input: None,
        }
    }

    /// Span all flow slots with one element.
    pub fn stretch(mut self) -> Self {
        self.mode = FlowMode::Stretch;
        self
    }

    /// Accept edits of the target property.
    pub fn with_input(mut self, input: Input) -> Self {
        self.input = Some(input);
        self
    }

    pub fn scalar(&self) -> ScalarId {
        self.scalar
    }

    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    /// Current value, `Null` if the scalar is gone.
    pub fn read(&self, store: &ScalarStore) -> Value {
        store.get(self.scalar).cloned().unwrap_or_default()
    }

    /// Convert `raw` and store it.
    pub fn write(&self, store: &mut ScalarStore, raw: &Value) -> Result<bool, InputError> {
        let Some(input) = &self.input else {
            return Err(InputError::new(
                error_ids::READ_ONLY,
                format!("'{}' does not accept input", self.target),
            ));
        };
        let kind = store
            .kind(self.scalar)
            .ok_or_else(|| {
                InputError::new(error_ids::REJECTED, DataError::UnknownScalar.to_string())
            })?;
        let value = input.convert(raw, kind)?;
        store
            .set(self.scalar, value)
            .map_err(|err| InputError::new(error_ids::REJECTED, err.to_string()))
    }
}

impl Binding for ScalarBinding {
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
        self.input.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::view::ElementKind;

    #[test]
    fn test_set_checks_kind_and_signals_changes() {
        let mut store = ScalarStore::new();
        let limit = store.insert("limit", Value::Int(10));
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        store.changed().connect(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(store.set(limit, Value::Int(10)), Ok(false));
        assert_eq!(store.set(limit, Value::Int(5)), Ok(true));
        assert!(matches!(
            store.set(limit, Value::from("x")),
            Err(DataError::KindMismatch { .. })
        ));
        assert_eq!(store.get(limit), Some(&Value::Int(5)));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(store.by_name("limit"), Some(limit));
    }

    #[test]
    fn test_value_rule() {
        let mut store = ScalarStore::new();
        let limit = store.insert("limit", Value::Int(10));
        store.set_rule(limit, |v| match v.as_int() {
            Some(n) if n > 100 => Some(InputError::new("limit.range", "too large")),
            _ => None,
        });
        assert_eq!(store.value_error(limit), None);
        store.set(limit, Value::Int(101)).unwrap();
        assert_eq!(store.value_error(limit).map(|e| e.id), Some("limit.range".into()));
    }

    #[test]
    fn test_binding_write() {
        let mut store = ScalarStore::new();
        let filter = store.insert("filter", Value::Null);
        let spec = ElementSpec::simple(ElementKind("text"), "text");
        let binding = ScalarBinding::new(spec.clone(), GridRange::cell(0, 0), "text", filter);
        assert!(binding.write(&mut store, &Value::from("a")).is_err());

        let binding = binding.with_input(Input::new());
        assert_eq!(binding.write(&mut store, &Value::from("a")), Ok(true));
        assert_eq!(binding.read(&store), Value::from("a"));
        assert_eq!(binding.mode(), FlowMode::Repeat);
        assert_eq!(
            ScalarBinding::new(spec, GridRange::cell(0, 0), "text", filter).stretch().mode(),
            FlowMode::Stretch
        );
    }
}
