//! Logging facilities for Horizon Datagrid.
//!
//! Horizon Datagrid uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_datagrid=debug,horizon_datagrid_core=info")
//!     .init();
//! ```
//!
//! Each subsystem logs under one of the [`targets`] so it can be filtered
//! independently.

/// Span names used throughout Horizon Datagrid.
pub mod span_names {
    /// A full layout pass.
    pub const LAYOUT_PASS: &str = "horizon_datagrid::layout_pass";
    /// Draining and applying pending user edits.
    pub const FLUSH_EDITS: &str = "horizon_datagrid::flush_edits";
    /// Merging completed validator runs.
    pub const VALIDATION_PUMP: &str = "horizon_datagrid::validation_pump";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_datagrid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_datagrid_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "horizon_datagrid_core::property";
    /// Background thread pool target.
    pub const THREADPOOL: &str = "horizon_datagrid_core::threadpool";
    /// UI delivery queue target.
    pub const QUEUE: &str = "horizon_datagrid_core::queue";
    /// Performance spans.
    pub const PERF: &str = "horizon_datagrid::perf";
}

/// A guard for timing an operation.
///
/// Creates an `info` span under [`targets::PERF`] that stays entered until the
/// guard is dropped.
///
/// # Example
///
/// ```
/// use horizon_datagrid_core::logging::PerfSpan;
///
/// fn layout_pass() {
///     let _span = PerfSpan::new("layout_pass");
///     // ... expensive work ...
/// }
/// layout_pass();
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_datagrid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
