//! Bindings between data and element properties.
//!
//! A binding places one element in a [`GridRange`], names the element
//! property it drives and knows where the value comes from. Row bindings
//! read a column of the current row, scalar bindings read a
//! [`ScalarStore`] entry and block bindings compute an aggregate over a
//! block of rows.
//!
//! Bindings with an [`Input`] also run the other way: user edits of the
//! target property are queued as [`PendingEdit`]s and written back by the
//! presenter on its next flush.

mod block;
mod input;
mod row;
mod scalar;
mod template;

use std::sync::Arc;

use horizon_datagrid_core::UiSender;

use crate::data::Value;
use crate::elements::ElementId;
use crate::grid::GridRange;
use crate::logging::targets;
use crate::view::{Element, ElementSpec, Owner};

pub use block::{BlockBinding, BlockContext};
pub use input::{Input, convert_to_kind, error_ids};
pub use row::{RowBinding, RowSource};
pub use scalar::{ScalarBinding, ScalarId, ScalarStore};
pub use template::{Template, TemplateBuilder, TemplateChild};

/// A user edit waiting to be written back.
///
/// `generation` identifies the attachment the edit was made under; the
/// presenter drops edits whose element has since been recycled.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    /// The edited element.
    pub element: ElementId,
    /// Who owned the element when it was edited.
    pub owner: Owner,
    /// Index of the binding within its template.
    pub binding: usize,
    /// Attach generation at edit time.
    pub generation: u64,
    /// The entered value.
    pub value: Value,
}

/// Where a binding is attaching its element.
#[derive(Debug, Clone, Copy)]
pub struct AttachContext<'a> {
    pub(crate) id: ElementId,
    pub(crate) owner: Owner,
    pub(crate) binding: usize,
    pub(crate) edits: &'a UiSender<PendingEdit>,
}

/// Behavior shared by every binding kind.
pub trait Binding: Send + Sync {
    /// The element this binding creates.
    fn element(&self) -> &ElementSpec;

    /// The cells the element occupies.
    fn range(&self) -> &GridRange;

    /// The element property the binding drives.
    fn target(&self) -> &Arc<str>;

    /// Whether edits of the target are written back.
    fn accepts_input(&self) -> bool;

    /// Attach `element` to its owner and push the first value.
    ///
    /// Input bindings also install a listener forwarding edits of the
    /// target property; the listener is dropped on detach.
    fn attach(&self, cx: AttachContext<'_>, element: &mut Element, value: Value) {
        let generation = element.attach(cx.owner);
        if !element.push(self.target(), value) {
            tracing::warn!(
                target: targets::BINDING,
                kind = %element.kind(),
                property = %self.target(),
                "element has no such property"
            );
        }
        if self.accepts_input() {
            let target = self.target().clone();
            let sender = cx.edits.clone();
            let (id, owner, binding) = (cx.id, cx.owner, cx.binding);
            element.listen(move |edit| {
                if edit.property != target {
                    return;
                }
                let pending = PendingEdit {
                    element: id,
                    owner,
                    binding,
                    generation,
                    value: edit.value.clone(),
                };
                if let Err(err) = sender.send(pending) {
                    tracing::warn!(target: targets::BINDING, %err, "dropped user edit");
                }
            });
        }
    }

    /// Push a refreshed value to an attached element.
    fn refresh(&self, element: &mut Element, value: Value) {
        element.push(self.target(), value);
    }

    /// Release `element` from its owner.
    fn detach(&self, element: &mut Element) -> Owner {
        element.detach()
    }
}

#[cfg(test)]
mod tests {
    use horizon_datagrid_core::UiQueue;
    use slotmap::SlotMap;

    use super::*;
    use crate::data::{ColumnId, RowKey};
    use crate::view::ElementKind;

    fn binding(input: bool) -> RowBinding {
        let b = RowBinding::column(
            ElementSpec::simple(ElementKind("text"), "text"),
            GridRange::cell(0, 0),
            "text",
            ColumnId(0),
        );
        if input { b.with_input(Input::new()) } else { b }
    }

    #[test]
    fn test_attach_forwards_target_edits() {
        let queue = UiQueue::unbounded();
        let sender = queue.sender();
        let mut ids = SlotMap::<ElementId, ()>::with_key();
        let id = ids.insert(());
        let b = binding(true);
        let mut element = b.element().create();
        let cx = AttachContext { id, owner: Owner::Row(RowKey(1)), binding: 0, edits: &sender };

        b.attach(cx, &mut element, Value::from("a"));
        assert_eq!(element.get("text"), Some(Value::from("a")));

        element.edit("text", Value::from("b")).unwrap();
        let edits = queue.drain();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].generation, 1);
        assert_eq!(edits[0].value, Value::from("b"));

        b.detach(&mut element);
        element.edit("text", Value::from("c")).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_read_only_binding_installs_no_listener() {
        let queue = UiQueue::<PendingEdit>::unbounded();
        let sender = queue.sender();
        let mut ids = SlotMap::<ElementId, ()>::with_key();
        let b = binding(false);
        let mut element = b.element().create();
        let cx = AttachContext {
            id: ids.insert(()),
            owner: Owner::Block(0),
            binding: 0,
            edits: &sender,
        };
        b.attach(cx, &mut element, Value::Null);
        assert_eq!(element.listener_count(), 0);
    }
}
