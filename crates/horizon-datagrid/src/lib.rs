//! Horizon Datagrid - a presenter/layout engine for virtualized, data-bound
//! tabular views.
//!
//! Rows and scalar values from a [`DataSource`](data::DataSource) are bound
//! to recyclable view elements arranged on a track grid. Only the rows in
//! view are materialized; elements leaving the view are detached and pooled
//! for the rows entering it. User edits flow back through the bindings,
//! failed conversions stay on the presenter as input errors, and async
//! validators report per-row messages through sealed, copy-on-write
//! collections.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use horizon_datagrid::prelude::*;
//!
//! let data = Arc::new(
//!     DataSet::builder()
//!         .required_column("name", ValueKind::Text)
//!         .column("age", ValueKind::Int)
//!         .build(),
//! );
//! for (name, age) in [("ada", 36), ("alan", 41), ("grace", 85)] {
//!     data.push_row(vec![Value::from(name), Value::Int(age)]).unwrap();
//! }
//!
//! let text = ElementSpec::simple(ElementKind("text"), "text");
//! let definition = GridDefinition::builder()
//!     .column(GridLength::Fixed(120.0))
//!     .column(GridLength::Star(1.0))
//!     .row(GridLength::Fixed(20.0))
//!     .build()
//!     .unwrap();
//! let rows = TemplateBuilder::new()
//!     .add_child(
//!         RowBinding::column(text.clone(), GridRange::cell(0, 0), "text", ColumnId(0)),
//!         "name",
//!     )
//!     .add_child(
//!         RowBinding::column(text, GridRange::cell(1, 0), "text", ColumnId(1))
//!             .with_input(Input::new()),
//!         "age",
//!     )
//!     .build();
//!
//! let mut grid = GridPresenter::new(
//!     data,
//!     GridTemplate::new(definition).with_rows(rows),
//!     ScalarStore::new(),
//!     AsyncValidatorGroup::new(),
//!     GridConfig::default(),
//! )
//! .unwrap();
//! grid.layout(Viewport::new(300.0, 40.0));
//! assert_eq!(grid.rows().len(), 2);
//! ```

pub use horizon_datagrid_core::*;

pub mod binding;
pub mod config;
pub mod data;
pub mod elements;
pub mod error;
pub mod flow;
pub mod grid;
pub mod layout;
pub mod logging;
pub mod prelude;
pub mod presenter;
pub mod validation;
pub mod view;

pub use config::GridConfig;
pub use error::{DataError, Error, GridError, Result, ValidationFault};
pub use presenter::GridPresenter;
