use std::ops::Range;

use super::UnitRect;
use crate::flow::{FlowMode, RepeatDimension, RepeatOrientation, RepeatPosition};
use crate::grid::{Axis, GridDefinition, GridRange};

/// A materialized row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPlacement {
    pub ordinal: usize,
    pub block: usize,
    pub flow_index: usize,
    pub position: RepeatPosition,
}

/// How one axis repeats: tracks in `region` are copied `units` times, each
/// copy `extent` long. Tracks past the region move out by the extra copies.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AxisFrame {
    pub(crate) region: Range<usize>,
    pub(crate) extent: f32,
    pub(crate) units: usize,
}

impl AxisFrame {
    pub(crate) fn single() -> Self {
        Self {
            region: 0..0,
            extent: 0.0,
            units: 1,
        }
    }

fn place(
        &self,
        definition: &GridDefinition,
        axis: Axis,
        tracks: Range<usize>,
        index: usize,
        stretch: bool,
    ) -> (f32, f32) {
        let mut start = definition.offset(axis, tracks.start);
        let mut length = definition.extent(axis, tracks.clone());
        let inside = !self.region.is_empty()
            && tracks.start >= self.region.start
            && tracks.end <= self.region.end;
        let extra = self.units.saturating_sub(1) as f32 * self.extent;
        if inside {
            if stretch {
                length += extra;
            } else {
                start += index as f32 * self.extent;
            }
        } else if !self.region.is_empty() && tracks.start >= self.region.end {
            start += extra;
        }
        (start, length)
    }
}

/// The result of one layout pass.
///
/// Plans are plain values: two passes over the same inputs produce equal
/// plans.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub orientation: RepeatOrientation,
    /// Extent of the repeat region in units.
    pub dimension: RepeatDimension,
    /// Number of blocks the data fills.
    pub block_count: usize,
    /// Materialized blocks.
    pub blocks: Range<usize>,
    /// Materialized rows in ordinal order.
    pub rows: Vec<RowPlacement>,
    /// Presenter slots per repeating scalar binding.
    pub flow_slots: usize,
    pub(crate) flow_count: usize,
    pub(crate) row_count: usize,
    pub(crate) main: AxisFrame,
    pub(crate) flow: AxisFrame,
    pub(crate) main_axis: Axis,
}

impl LayoutPlan {
    /// Ordinals of the rows in `block`.
    pub fn block_rows(&self, block: usize) -> Range<usize> {
        if self.orientation == RepeatOrientation::Z {
            return self.rows.first().map_or(0..0, |r| r.ordinal..r.ordinal + 1);
        }
        let start = (block * self.flow_count).min(self.row_count);
        let end = ((block + 1) * self.flow_count).min(self.row_count);
        start..end
    }

    /// Whether the row at `ordinal` is materialized.
    pub fn contains_row(&self, ordinal: usize) -> bool {
        self.rows
            .binary_search_by_key(&ordinal, |r| r.ordinal)
            .is_ok()
    }

    pub fn row(&self, ordinal: usize) -> Option<&RowPlacement> {
        self.rows
            .binary_search_by_key(&ordinal, |r| r.ordinal)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Rectangle of a row binding's element.
    pub fn row_rect(
        &self,
        definition: &GridDefinition,
        range: &GridRange,
        block: usize,
        flow_index: usize,
    ) -> UnitRect {
        self.rect(definition, range, block, flow_index, false)
    }

    /// Rectangle of a block binding's element. Blocks span the flow axis.
    pub fn block_rect(
        &self,
        definition: &GridDefinition,
        range: &GridRange,
        block: usize,
    ) -> UnitRect {
        self.rect(definition, range, block, 0, true)
    }

    /// Rectangle of a scalar binding's element in flow `slot`.
    pub fn scalar_rect(
        &self,
        definition: &GridDefinition,
        range: &GridRange,
        slot: usize,
        mode: FlowMode,
    ) -> UnitRect {
        self.rect(definition, range, 0, slot, mode == FlowMode::Stretch)
    }

    /// Size of the laid-out content as `(width, height)`.
    pub fn content_size(&self, definition: &GridDefinition) -> (f32, f32) {
        let along = |axis: Axis| {
            let frame = self.frame(axis);
            definition.total_extent(axis) + frame.units.saturating_sub(1) as f32 * frame.extent
        };
        (along(Axis::Horizontal), along(Axis::Vertical))
    }

    fn frame(&self, axis: Axis) -> &AxisFrame {
        if axis == self.main_axis { &self.main } else { &self.flow }
    }

fn rect(
        &self,
        definition: &GridDefinition,
        range: &GridRange,
        block: usize,
        flow_index: usize,
        stretch_flow: bool,
    ) -> UnitRect {
        let span = |axis: Axis| {
            let (index, stretch) = if axis == self.main_axis {
                (block, false)
            } else {
                (flow_index, stretch_flow)
            };
            self.frame(axis)
                .place(definition, axis, range.along(axis), index, stretch)
        };
        let (x, width) = span(Axis::Horizontal);
        let (y, height) = span(Axis::Vertical);
        UnitRect::new(x, y, width, height)
    }
}
