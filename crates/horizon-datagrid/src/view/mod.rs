//! The view element contract.
//!
//! Rendering belongs to the host. The engine only needs something with named
//! properties it can push values into, a notification when the user edits
//! one of them, and attach/detach bookkeeping so recycled elements never
//! talk to the wrong presenter.

mod element;

pub use element::{Element, ElementFactory, ElementKind, ElementSpec, Owner, UserEdit};
