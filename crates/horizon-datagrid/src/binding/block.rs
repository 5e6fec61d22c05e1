use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use super::Binding;
use crate::data::{DataSource, Value};
use crate::grid::GridRange;
use crate::view::ElementSpec;

/// What a block binding sees when computing its value.
pub struct BlockContext<'a> {
    /// Block ordinal.
    pub block: usize,
    /// Ordinals of the rows in the block.
    pub rows: Range<usize>,
    pub data: &'a dyn DataSource,
}

type BlockFn = Arc<dyn Fn(&BlockContext<'_>) -> Value + Send + Sync>;

/// Binds an element to each materialized block, e.g. a per-block total.
///
/// Block bindings are display only.
#[derive(Clone)]
pub struct BlockBinding {
    element: ElementSpec,
    range: GridRange,
    target: Arc<str>,
    compute: BlockFn,
}

impl BlockBinding {
    pub fn new<F>(element: ElementSpec, range: GridRange, target: &str, compute: F) -> Self
    where
        F: Fn(&BlockContext<'_>) -> Value + Send + Sync + 'static,
    {
        Self {
            element,
            range,
            target: target.into(),
            compute: Arc::new(compute),
        }
    }

    pub fn read(&self, cx: &BlockContext<'_>) -> Value {
        (self.compute)(cx)
    }
}

impl fmt::Debug for BlockBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockBinding")
            .field("element", &self.element)
            .field("range", &self.range)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Binding for BlockBinding {
    fn element(&self) -> &ElementSpec {
        &self.element
    }

    fn range(&self) -> &GridRange {
        &self.range
    }

    fn target(&self) -> &Arc<str> {
        &self.target
    }

    fn accepts_input(&self) -> bool {
        false
    }
}
