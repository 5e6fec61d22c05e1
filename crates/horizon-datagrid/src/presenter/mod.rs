//! Presenters: the per-unit state behind materialized elements, and the
//! [`GridPresenter`] that drives layout, binding and validation.

mod grid;
mod template;
mod units;

pub use grid::{GridPresenter, RowErrors};
pub use template::{BlockTemplate, GridTemplate, RowTemplate, ScalarTemplate};
pub use units::{BlockPresenter, RowPresenter, ScalarPresenter};
