//! Prelude module for Horizon Datagrid.
//!
//! ```ignore
//! use horizon_datagrid::prelude::*;
//! ```
//!
//! This provides access to:
//! - Data (`DataSet`, `DataSource`, `Value`, `ColumnId`, `RowKey`)
//! - Grid and flow (`GridDefinition`, `GridRange`, `RepeatOrientation`)
//! - Bindings and templates (`RowBinding`, `ScalarBinding`, `TemplateBuilder`)
//! - The presenter (`GridPresenter`, `GridTemplate`, `Viewport`)
//! - Validation (`AsyncValidatorGroup`, `FnValidator`, `ValidationMessage`)

// ============================================================================
// Data
// ============================================================================

pub use crate::data::{ColumnId, DataSet, DataSource, RowKey, RowSnapshot, Value, ValueKind};

// ============================================================================
// Grid, Flow and Layout
// ============================================================================

pub use crate::flow::{FlowMode, RepeatOrientation};
pub use crate::grid::{Axis, GridDefinition, GridLength, GridLine, GridLinePosition, GridRange};
pub use crate::layout::{UnitRect, Viewport};

// ============================================================================
// Elements and Bindings
// ============================================================================

pub use crate::binding::{
    BlockBinding, Input, RowBinding, ScalarBinding, ScalarId, ScalarStore, TemplateBuilder,
};
pub use crate::view::{Element, ElementKind, ElementSpec};

// ============================================================================
// Presenter
// ============================================================================

pub use crate::config::GridConfig;
pub use crate::presenter::{GridPresenter, GridTemplate, RowErrors};

// ============================================================================
// Validation
// ============================================================================

pub use crate::validation::{
    AsyncValidator, AsyncValidatorGroup, FnValidator, InputError, IntValidator, Severity,
    ValidationMessage,
};
