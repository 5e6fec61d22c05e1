//! Log targets for the presenter engine.
//!
//! Use these with `tracing` directives to filter logs by subsystem, e.g.
//! `RUST_LOG=horizon_datagrid::layout=debug,horizon_datagrid::validation=trace`.

pub use horizon_datagrid_core::logging::{PerfSpan, span_names};

/// Target names for log filtering.
pub mod targets {
    /// Layout manager target.
    pub const LAYOUT: &str = "horizon_datagrid::layout";
    /// Elements manager target.
    pub const ELEMENTS: &str = "horizon_datagrid::elements";
    /// Binding pipeline target.
    pub const BINDING: &str = "horizon_datagrid::binding";
    /// Validation engine target.
    pub const VALIDATION: &str = "horizon_datagrid::validation";
    /// Data source target.
    pub const DATA: &str = "horizon_datagrid::data";
    /// Presenter target.
    pub const PRESENTER: &str = "horizon_datagrid::presenter";
}
