//! Presenter configuration.

use horizon_datagrid_core::ThreadPoolConfig;

use crate::flow::RepeatOrientation;

/// Settings for a [`GridPresenter`](crate::presenter::GridPresenter).
///
/// # Example
///
/// ```
/// use horizon_datagrid::config::GridConfig;
/// use horizon_datagrid::flow::RepeatOrientation;
///
/// let config = GridConfig::default()
///     .with_orientation(RepeatOrientation::Y)
///     .with_flow_count(3)
///     .with_overscan(1);
/// assert_eq!(config.flow_count, 3);
/// ```
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Fill order of blocks and rows.
    pub orientation: RepeatOrientation,
    /// Rows per block, laid out along the flow axis.
    pub flow_count: usize,
    /// Extra blocks materialized on each side of the viewport.
    pub overscan: usize,
    /// Pooled elements kept per element kind. `None` sizes the pool to the
    /// materialized window after the first layout pass.
    pub pool_capacity: Option<usize>,
    /// Length used for `Auto` tracks.
    pub auto_track_length: f32,
    /// Workers running async validators.
    pub thread_pool: ThreadPoolConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            orientation: RepeatOrientation::X,
            flow_count: 1,
            overscan: 0,
            pool_capacity: None,
            auto_track_length: 24.0,
            thread_pool: ThreadPoolConfig::with_threads(2).with_thread_name("datagrid-validator"),
        }
    }
}

impl GridConfig {
    pub fn with_orientation(mut self, orientation: RepeatOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// # Panics
    ///
    /// Panics if `flow_count` is zero.
    pub fn with_flow_count(mut self, flow_count: usize) -> Self {
        assert!(flow_count > 0, "flow count must be at least 1");
        self.flow_count = flow_count;
        self
    }

    pub fn with_overscan(mut self, blocks: usize) -> Self {
        self.overscan = blocks;
        self
    }

    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = Some(capacity);
        self
    }

    pub fn with_auto_track_length(mut self, length: f32) -> Self {
        self.auto_track_length = length;
        self
    }

    pub fn with_thread_pool(mut self, config: ThreadPoolConfig) -> Self {
        self.thread_pool = config;
        self
    }
}
