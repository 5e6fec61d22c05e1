//! Property system for Horizon Datagrid.
//!
//! Properties are plain observable fields. A [`Property<T>`] wraps a value and
//! reports whether a write changed it; an [`ObservableProperty<T>`] adds a
//! change-notification callback list and per-field configuration
//! ([`PropertyMeta<T>`]) supplied when the field is declared.
//!
//! # Example
//!
//! ```
//! use horizon_datagrid_core::property::{ObservableProperty, PropertyMeta};
//!
//! let width = ObservableProperty::new(
//!     PropertyMeta::new("width", 0.0_f32).with_coerce(|w: f32| w.max(0.0)),
//! );
//! width.changed().connect(|(old, new)| println!("{old} -> {new}"));
//!
//! assert!(width.set(-5.0) == false); // coerced to 0.0, unchanged
//! assert!(width.set(12.5));
//! assert_eq!(width.get(), 12.5);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::signal::Signal;

/// A reactive property that tracks changes.
///
/// `Property<T>` wraps a value and provides change detection. When `set()` is
/// called, it compares the new value with the current one and returns whether
/// the value actually changed.
///
/// # Example
///
/// ```
/// use horizon_datagrid_core::Property;
///
/// let prop = Property::new(42);
/// assert!(!prop.set(42));
/// assert!(prop.set(100));
/// assert_eq!(prop.get(), 100);
/// ```
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

type Coerce<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Declaration-time configuration for an [`ObservableProperty`].
///
/// Holds the field name, its default value and an optional coercion applied
/// to every write before change detection.
#[derive(Clone)]
pub struct PropertyMeta<T> {
    name: Arc<str>,
    default: T,
    coerce: Option<Coerce<T>>,
    read_only: bool,
}

impl<T: Clone> PropertyMeta<T> {
    /// Metadata with a name and default value.
    pub fn new(name: impl Into<Arc<str>>, default: T) -> Self {
        Self {
            name: name.into(),
            default,
            coerce: None,
            read_only: false,
        }
    }

    /// Apply `coerce` to every value written to the property.
    pub fn with_coerce<F>(mut self, coerce: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.coerce = Some(Arc::new(coerce));
        self
    }

    /// Reject writes through [`ObservableProperty::try_set`].
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default value.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Whether the property rejects external writes.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn coerce(&self, value: T) -> T {
        match &self.coerce {
            Some(coerce) => coerce(value),
            None => value,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PropertyMeta<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMeta")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("coerced", &self.coerce.is_some())
            .field("read_only", &self.read_only)
            .finish()
    }
}

/// A property with a change-notification callback list.
///
/// Writes are coerced through the declaring [`PropertyMeta`], compared with the
/// current value, and on change the `changed` signal fires with
/// `(old, new)`.
pub struct ObservableProperty<T> {
    meta: PropertyMeta<T>,
    value: Property<T>,
    changed: Signal<(T, T)>,
}

impl<T: Clone + PartialEq + Send + 'static> ObservableProperty<T> {
    /// Create a property holding the metadata's default value.
    pub fn new(meta: PropertyMeta<T>) -> Self {
        let value = Property::new(meta.default.clone());
        Self {
            meta,
            value,
            changed: Signal::new(),
        }
    }

    /// The field's metadata.
    pub fn meta(&self) -> &PropertyMeta<T> {
        &self.meta
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Access the current value without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.value.with(f)
    }

    /// Coerce and store `value`, notifying on change.
    ///
    /// Returns `true` if the stored value changed.
    pub fn set(&self, value: T) -> bool {
        let value = self.meta.coerce(value);
        match self.value.replace(value.clone()) {
            Some(old) => {
                tracing::trace!(
                    target: "horizon_datagrid_core::property",
                    name = %self.meta.name,
                    "property changed"
                );
                self.changed.emit((old, value));
                true
            }
            None => false,
        }
    }

    /// Like [`set`](Self::set), but honours the read-only flag.
    pub fn try_set(&self, value: T) -> Result<bool, PropertyError> {
        if self.meta.read_only {
            return Err(PropertyError::ReadOnly {
                name: self.meta.name.to_string(),
            });
        }
        Ok(self.set(value))
    }

    /// Restore the declared default.
    pub fn reset(&self) -> bool {
        self.set(self.meta.default.clone())
    }

    /// Change notifications as `(old, new)`.
    pub fn changed(&self) -> &Signal<(T, T)> {
        &self.changed
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ObservableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableProperty")
            .field("name", &self.meta.name)
            .field("value", &self.value.get())
            .finish()
    }
}

/// Error types for property operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The property was not found.
    NotFound {
        /// The name of the property that was not found.
        name: String,
    },
    /// The property is read-only and cannot be modified.
    ReadOnly {
        /// The name of the read-only property.
        name: String,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "Property '{}' not found", name),
            Self::ReadOnly { name } => write!(f, "Property '{}' is read-only", name),
        }
    }
}

impl std::error::Error for PropertyError {}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_property_set_detects_change() {
        let prop = Property::new(10);
        assert!(!prop.set(10));
        assert!(prop.set(20));
        assert_eq!(prop.get(), 20);
    }

    #[test]
    fn test_property_replace() {
        let prop = Property::new("hello".to_string());
        assert!(prop.replace("hello".to_string()).is_none());
        assert_eq!(prop.replace("world".to_string()), Some("hello".to_string()));
        assert_eq!(prop.get(), "world");
    }

    #[test]
    fn test_observable_notifies_old_and_new() {
        let prop = ObservableProperty::new(PropertyMeta::new("count", 1));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        prop.changed().connect(move |&(old, new)| seen_clone.lock().push((old, new)));

        assert!(prop.set(2));
        assert!(!prop.set(2));
        assert!(prop.reset());

        assert_eq!(*seen.lock(), vec![(1, 2), (2, 1)]);
    }

    #[test]
    fn test_observable_coerces_before_compare() {
        let prop = ObservableProperty::new(
            PropertyMeta::new("percent", 50).with_coerce(|v: i32| v.clamp(0, 100)),
        );
        assert!(prop.set(250));
        assert_eq!(prop.get(), 100);
        assert!(!prop.set(101));
    }

    #[test]
    fn test_observable_read_only() {
        let prop = ObservableProperty::new(PropertyMeta::new("id", 7).read_only());
        assert_eq!(
            prop.try_set(8),
            Err(PropertyError::ReadOnly {
                name: "id".to_string()
            })
        );
        assert_eq!(prop.get(), 7);
    }
}
