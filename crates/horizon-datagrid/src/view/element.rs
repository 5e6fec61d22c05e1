use std::fmt;
use std::sync::Arc;

use horizon_datagrid_core::{
    ConnectionId, ObservableProperty, PropertyError, PropertyMeta, Signal, ThreadAffinity,
};

use crate::data::{RowKey, Value};

/// Names a family of interchangeable elements. Elements of the same kind
/// share a recycling pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKind(pub &'static str);

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Creates elements of one kind.
pub type ElementFactory = Arc<dyn Fn() -> Element + Send + Sync>;

/// A kind together with the factory that creates it.
#[derive(Clone)]
pub struct ElementSpec {
    kind: ElementKind,
    factory: ElementFactory,
}

impl ElementSpec {
    /// Describe elements of `kind` produced by `factory`.
    pub fn new<F>(kind: ElementKind, factory: F) -> Self
    where
        F: Fn() -> Element + Send + Sync + 'static,
    {
        Self {
            kind,
            factory: Arc::new(factory),
        }
    }

    /// A spec whose elements carry a single property called `property`.
    pub fn simple(kind: ElementKind, property: &'static str) -> Self {
        Self::new(kind, move || {
            Element::new(kind).with_property(PropertyMeta::new(property, Value::Null))
        })
    }

    /// The element kind.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Create a fresh element.
    ///
    /// # Panics
    ///
    /// Panics if the factory produced an element of a different kind.
    pub fn create(&self) -> Element {
        let element = (self.factory)();
        assert_eq!(
            element.kind(),
            self.kind,
            "factory for {} produced a {} element",
            self.kind,
            element.kind()
        );
        element
    }
}

impl fmt::Debug for ElementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementSpec").field("kind", &self.kind).finish()
    }
}

/// The presenter unit an element is currently attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// A row presenter.
    Row(RowKey),
    /// A scalar presenter, by binding index and flow slot.
    Scalar { binding: usize, slot: usize },
    /// A block presenter, by block ordinal.
    Block(usize),
}

/// A user-originated edit of an element property.
#[derive(Debug, Clone, PartialEq)]
pub struct UserEdit {
    /// The edited property.
    pub property: Arc<str>,
    /// The value the user entered.
    pub value: Value,
}

/// A recyclable view element.
///
/// Elements are created by an [`ElementFactory`], owned by the
/// [`ElementsManager`](crate::elements::ElementsManager) and lent to one
/// presenter at a time. Each assignment is bracketed by exactly one attach
/// and one detach; the engine only pushes property values while attached.
///
/// # Example
///
/// ```
/// use horizon_datagrid::data::Value;
/// use horizon_datagrid::view::{Element, ElementKind};
/// use horizon_datagrid_core::PropertyMeta;
///
/// let element = Element::new(ElementKind("text"))
///     .with_property(PropertyMeta::new("text", Value::from("")))
///     .with_property(PropertyMeta::new("width", Value::Float(0.0))
///         .with_coerce(|v| match v {
///             Value::Float(w) if w < 0.0 => Value::Float(0.0),
///             other => other,
///         }));
///
/// assert_eq!(element.get("text"), Some(Value::from("")));
/// assert!(!element.is_attached());
/// ```
pub struct Element {
    kind: ElementKind,
    properties: Vec<ObservableProperty<Value>>,
    user_edited: Signal<UserEdit>,
    owner: Option<Owner>,
    generation: u64,
    attach_count: u64,
    detach_count: u64,
    push_count: u64,
    listeners: Vec<ConnectionId>,
    affinity: ThreadAffinity,
}

impl Element {
    /// Create an element with no properties.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            user_edited: Signal::new(),
            owner: None,
            generation: 0,
            attach_count: 0,
            detach_count: 0,
            push_count: 0,
            listeners: Vec::new(),
            affinity: ThreadAffinity::current(),
        }
    }

    /// Declare a property.
    pub fn with_property(mut self, meta: PropertyMeta<Value>) -> Self {
        self.properties.push(ObservableProperty::new(meta));
        self
    }

    /// The element kind.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&ObservableProperty<Value>> {
        self.properties.iter().find(|p| p.meta().name() == name)
    }

    /// Current value of a property.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.property(name).map(|p| p.get())
    }

    /// Simulate or forward a user edit: store the value and announce it on
    /// [`user_edited`](Self::user_edited).
    pub fn edit(&self, name: &str, value: Value) -> Result<(), PropertyError> {
        self.affinity.debug_assert_same_thread();
        let property = self.property(name).ok_or_else(|| PropertyError::NotFound {
            name: name.to_string(),
        })?;
        property.try_set(value.clone())?;
        self.user_edited.emit(UserEdit {
            property: Arc::from(name),
            value,
        });
        Ok(())
    }

    /// Emitted for every user edit.
    pub fn user_edited(&self) -> &Signal<UserEdit> {
        &self.user_edited
    }

    /// The current owner, if attached.
    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    /// Whether the element is attached to a presenter.
    pub fn is_attached(&self) -> bool {
        self.owner.is_some()
    }

    /// Incremented on every attach.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total attaches.
    pub fn attach_count(&self) -> u64 {
        self.attach_count
    }

    /// Total detaches.
    pub fn detach_count(&self) -> u64 {
        self.detach_count
    }

    /// Total engine-originated property pushes.
    pub fn push_count(&self) -> u64 {
        self.push_count
    }

    /// Bind the element to `owner`. Returns the new generation.
    ///
    /// # Panics
    ///
    /// Panics if the element is already attached.
    pub(crate) fn attach(&mut self, owner: Owner) -> u64 {
        self.affinity.debug_assert_same_thread();
        if let Some(current) = self.owner {
            panic!(
                "{} element attached to {owner:?} while still attached to {current:?}",
                self.kind
            );
        }
        self.owner = Some(owner);
        self.generation += 1;
        self.attach_count += 1;
        self.generation
    }

    /// Release the element from its owner, dropping all edit listeners.
    ///
    /// # Panics
    ///
    /// Panics if the element is not attached.
    pub(crate) fn detach(&mut self) -> Owner {
        self.affinity.debug_assert_same_thread();
        let Some(owner) = self.owner.take() else {
            panic!("{} element detached while not attached", self.kind);
        };
        for id in self.listeners.drain(..) {
            self.user_edited.disconnect(id);
        }
        self.detach_count += 1;
        owner
    }

    /// Write a value on behalf of the engine.
    ///
    /// Returns `false` when the element has no such property.
    ///
    /// # Panics
    ///
    /// Panics if the element is not attached.
    pub(crate) fn push(&mut self, name: &str, value: Value) -> bool {
        assert!(
            self.owner.is_some(),
            "push of '{name}' to a detached {} element",
            self.kind
        );
        self.push_count += 1;
        match self.properties.iter().find(|p| p.meta().name() == name) {
            Some(property) => {
                property.set(value);
                true
            }
            None => false,
        }
    }

    /// Install a user-edit listener that lives until the next detach.
    pub(crate) fn listen<F>(&mut self, listener: F)
    where
        F: Fn(&UserEdit) + Send + Sync + 'static,
    {
        debug_assert!(self.owner.is_some());
        let id = self.user_edited.connect(listener);
        self.listeners.push(id);
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("owner", &self.owner)
            .field("generation", &self.generation)
            .field("properties", &self.properties.len())
            .finish()
    }
}
