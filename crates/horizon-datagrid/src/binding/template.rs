use std::sync::Arc;

use super::Binding;

/// A named binding within a [`Template`].
#[derive(Debug, Clone)]
pub struct TemplateChild<B> {
    name: Arc<str>,
    binding: B,
}

impl<B> TemplateChild<B> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }
}

/// Builds a [`Template`] one child at a time.
///
/// # Example
///
/// ```
/// use horizon_datagrid::binding::{RowBinding, TemplateBuilder};
/// use horizon_datagrid::data::ColumnId;
/// use horizon_datagrid::grid::GridRange;
/// use horizon_datagrid::view::{ElementKind, ElementSpec};
///
/// let text = ElementSpec::simple(ElementKind("text"), "text");
/// let rows = TemplateBuilder::new()
///     .add_child(
///         RowBinding::column(text.clone(), GridRange::cell(0, 0), "text", ColumnId(0)),
///         "name",
///     )
///     .add_child(RowBinding::column(text, GridRange::cell(1, 0), "text", ColumnId(1)), "age")
///     .build();
/// assert_eq!(rows.position("age"), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct TemplateBuilder<B> {
    children: Vec<TemplateChild<B>>,
}

impl<B: Binding> TemplateBuilder<B> {
    pub fn new() -> Self {
        Self { children: Vec::new() }
    }

    /// Append a child. Lookups by name find the first child added under it.
    pub fn add_child(mut self, binding: B, name: &str) -> Self {
        self.children.push(TemplateChild {
            name: name.into(),
            binding,
        });
        self
    }

    pub fn build(self) -> Template<B> {
        Template {
            children: self.children,
        }
    }
}

impl<B: Binding> Default for TemplateBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered list of bindings of one kind.
///
/// Binding indices are positions in this list and stay fixed for the life
/// of the template.
#[derive(Debug, Clone)]
pub struct Template<B> {
    children: Vec<TemplateChild<B>>,
}

impl<B> Template<B> {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&B> {
        self.children.get(index).map(|c| &c.binding)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| &*c.name == name)
    }

    pub fn by_name(&self, name: &str) -> Option<&B> {
        self.position(name).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &B> {
        self.children.iter().map(|c| &c.binding)
    }

    pub fn children(&self) -> &[TemplateChild<B>] {
        &self.children
    }
}

impl<B> Default for Template<B> {
    fn default() -> Self {
        Self { children: Vec::new() }
    }
}
