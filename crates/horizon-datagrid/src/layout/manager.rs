use std::ops::Range;

use super::plan::AxisFrame;
use super::{LayoutPlan, RowPlacement, Viewport};
use crate::config::GridConfig;
use crate::flow::{RepeatDimension, RepeatOrientation};
use crate::grid::{Axis, GridDefinition};
use crate::logging::targets;

/// Decides what to materialize for a viewport.
///
/// Every pass is computed from scratch; the manager keeps only its
/// configuration and the current row used by the `Z` orientation.
#[derive(Debug, Clone)]
pub struct LayoutManager {
    orientation: RepeatOrientation,
    flow_count: usize,
    overscan: usize,
    auto_track_length: f32,
    current_row: usize,
}

impl LayoutManager {
    pub fn new(config: &GridConfig) -> Self {
        assert!(config.flow_count > 0, "flow count must be at least 1");
        Self {
            orientation: config.orientation,
            flow_count: config.flow_count,
            overscan: config.overscan,
            auto_track_length: config.auto_track_length,
            current_row: 0,
        }
    }

    pub fn orientation(&self) -> RepeatOrientation {
        self.orientation
    }

    /// Rows per block; always 1 for `Z`.
    pub fn flow_count(&self) -> usize {
        match self.orientation {
            RepeatOrientation::Z => 1,
            _ => self.flow_count,
        }
    }

    /// The row shown by the `Z` orientation.
    pub fn current_row(&self) -> usize {
        self.current_row
    }

    pub fn set_current_row(&mut self, ordinal: usize) {
        self.current_row = ordinal;
    }

    /// Measure both axes of `definition` against `viewport`.
    ///
    /// Star tracks share the viewport length along their axis.
    pub fn measure(&self, definition: &mut GridDefinition, viewport: Viewport) {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            definition.measure(axis, viewport.length(axis), self.auto_track_length);
        }
    }

    /// Plan a pass over a measured `definition`.
    ///
    /// `repeat_region` is the range of main-axis tracks copied once per
    /// block, `flow_region` the range of flow-axis tracks copied once per
    /// row of a block.
    pub fn plan(
        &self,
        definition: &GridDefinition,
        repeat_region: Range<usize>,
        flow_region: Range<usize>,
        viewport: Viewport,
        row_count: usize,
    ) -> LayoutPlan {
        let Some(main_axis) = self.orientation.main_axis() else {
            return self.plan_single(row_count);
        };
        let flow_axis = main_axis.cross();
        let flow_count = self.flow_count;

        let block_count = row_count.div_ceil(flow_count);
        let block_extent = definition.extent(main_axis, repeat_region.clone()).max(1.0);
        let region_start = definition.offset(main_axis, repeat_region.start);

        let blocks = if block_count == 0 {
            0..0
        } else {
            let from = viewport.scroll - region_start;
            let to = from + viewport.length(main_axis);
            let first = (from / block_extent).floor().max(0.0) as usize;
            let last = (to / block_extent).ceil().max(0.0) as usize;
            let first = first.saturating_sub(self.overscan).min(block_count);
            let last = last.saturating_add(self.overscan).min(block_count).max(first);
            first..last
        };

        let dimension = self.orientation.dimension(flow_count, block_count.max(1));
        let rows: Vec<RowPlacement> = blocks
            .clone()
            .flat_map(|b| b * flow_count..((b + 1) * flow_count).min(row_count))
            .map(|ordinal| {
                let (block, flow_index) = self.orientation.split(ordinal, flow_count);
                RowPlacement {
                    ordinal,
                    block,
                    flow_index,
                    position: self.orientation.position(ordinal, dimension),
                }
            })
            .collect();

        let flow_extent = definition.extent(flow_axis, flow_region.clone());
        tracing::debug!(
            target: targets::LAYOUT,
            orientation = ?self.orientation,
            block_count,
            blocks = ?blocks,
            rows = rows.len(),
            "planned layout"
        );

        LayoutPlan {
            orientation: self.orientation,
            dimension,
            block_count,
            blocks,
            rows,
            flow_slots: flow_count,
            flow_count,
            row_count,
            main: AxisFrame {
                region: repeat_region,
                extent: block_extent,
                units: block_count.max(1),
            },
            flow: AxisFrame {
                region: flow_region,
                extent: flow_extent,
                units: flow_count,
            },
            main_axis,
        }
    }

    fn plan_single(&self, row_count: usize) -> LayoutPlan {
        let current = (self.current_row < row_count).then_some(self.current_row);
        let dimension = self.orientation.dimension(1, 1);
        let rows = current
            .map(|ordinal| RowPlacement {
                ordinal,
                block: 0,
                flow_index: 0,
                position: self.orientation.position(ordinal, dimension),
            })
            .into_iter()
            .collect();
        tracing::debug!(target: targets::LAYOUT, current = ?current, "planned single-unit layout");
        LayoutPlan {
            orientation: self.orientation,
            dimension: RepeatDimension::new(1, 1),
            block_count: usize::from(current.is_some()),
            blocks: if current.is_some() { 0..1 } else { 0..0 },
            rows,
            flow_slots: 1,
            flow_count: 1,
            row_count,
            main: AxisFrame::single(),
            flow: AxisFrame::single(),
            main_axis: Axis::Vertical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowMode, RepeatPosition};
    use crate::grid::{GridLength, GridRange};
    use crate::layout::UnitRect;

    /// Two 50-wide columns; a 20 header row, a 30 data row, a 10 footer.
    fn definition() -> GridDefinition {
        let mut def = GridDefinition::builder()
            .column(GridLength::Fixed(50.0))
            .column(GridLength::Fixed(50.0))
            .row(GridLength::Fixed(20.0))
            .row(GridLength::Fixed(30.0))
            .row(GridLength::Fixed(10.0))
            .build()
            .unwrap();
        def.measure(Axis::Horizontal, 100.0, 0.0);
        def.measure(Axis::Vertical, 100.0, 0.0);
        def
    }

    fn manager(orientation: RepeatOrientation, flow_count: usize) -> LayoutManager {
        LayoutManager::new(
            &GridConfig::default()
                .with_orientation(orientation)
                .with_flow_count(flow_count),
        )
    }

    #[test]
    fn test_x_virtualizes_blocks() {
        let def = definition();
        let m = manager(RepeatOrientation::X, 1);
        // 20 header, then blocks at 20, 50 and 80.
        let plan = m.plan(&def, 1..2, 0..2, Viewport::new(100.0, 100.0), 10);
        assert_eq!(plan.block_count, 10);
        assert_eq!(plan.blocks, 0..3);
        assert_eq!(plan.rows.len(), 3);

        let scrolled = m.plan(&def, 1..2, 0..2, Viewport::new(100.0, 100.0).with_scroll(95.0), 10);
        assert_eq!(scrolled.blocks, 2..6);
        assert_eq!(scrolled.rows[0].ordinal, 2);
        assert_eq!(scrolled.rows[0].position, RepeatPosition::new(0, 2));
    }

    #[test]
    fn test_overscan_clamps() {
        let def = definition();
        let m = LayoutManager::new(&GridConfig::default().with_overscan(2));
        let plan = m.plan(&def, 1..2, 0..2, Viewport::new(100.0, 50.0), 3);
        assert_eq!(plan.blocks, 0..3);
    }

    #[test]
    fn test_row_rects_repeat_along_main_axis() {
        let def = definition();
        let m = manager(RepeatOrientation::X, 1);
        let plan = m.plan(&def, 1..2, 0..2, Viewport::new(100.0, 100.0), 3);
        let cell = GridRange::cell(1, 1);
        assert_eq!(plan.row_rect(&def, &cell, 0, 0), UnitRect::new(50.0, 20.0, 50.0, 30.0));
        assert_eq!(plan.row_rect(&def, &cell, 2, 0), UnitRect::new(50.0, 80.0, 50.0, 30.0));
        // Footer moves past all three blocks.
        let footer = GridRange::cell(0, 2);
        assert_eq!(
            plan.scalar_rect(&def, &footer, 0, FlowMode::Repeat),
            UnitRect::new(0.0, 110.0, 50.0, 10.0)
        );
        assert_eq!(plan.content_size(&def), (100.0, 120.0));
    }

    #[test]
    fn test_flow_slots_and_stretch() {
        let mut def = GridDefinition::builder()
            .column(GridLength::Fixed(40.0))
            .row(GridLength::Fixed(20.0))
            .row(GridLength::Fixed(30.0))
            .build()
            .unwrap();
        let m = manager(RepeatOrientation::X, 3);
        m.measure(&mut def, Viewport::new(300.0, 300.0));
        let plan = m.plan(&def, 1..2, 0..1, Viewport::new(300.0, 300.0), 7);
        assert_eq!(plan.block_count, 3);
        assert_eq!(plan.dimension, RepeatDimension::new(3, 3));
        assert_eq!(plan.block_rows(2), 6..7);
        let r = plan.row(4).unwrap();
        assert_eq!((r.block, r.flow_index), (1, 1));
        assert_eq!(
            plan.row_rect(&def, &GridRange::cell(0, 1), r.block, r.flow_index),
            UnitRect::new(40.0, 50.0, 40.0, 30.0)
        );
        let header = GridRange::cell(0, 0);
        assert_eq!(
            plan.scalar_rect(&def, &header, 2, FlowMode::Repeat),
            UnitRect::new(80.0, 0.0, 40.0, 20.0)
        );
        assert_eq!(
            plan.scalar_rect(&def, &header, 0, FlowMode::Stretch),
            UnitRect::new(0.0, 0.0, 120.0, 20.0)
        );
    }

    #[test]
    fn test_y_fills_columns_first() {
        let mut def = GridDefinition::builder()
            .column(GridLength::Fixed(60.0))
            .row(GridLength::Fixed(10.0))
            .build()
            .unwrap();
        let m = manager(RepeatOrientation::Y, 3);
        m.measure(&mut def, Viewport::new(200.0, 30.0));
        let plan = m.plan(&def, 0..1, 0..1, Viewport::new(200.0, 30.0), 6);
        let positions: Vec<_> = plan.rows.iter().map(|r| (r.position.x, r.position.y)).collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_z_materializes_current_row_only() {
        let def = definition();
        let mut m = manager(RepeatOrientation::Z, 1);
        let plan = m.plan(&def, 1..2, 0..2, Viewport::new(100.0, 100.0), 5);
        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].ordinal, 0);
        assert_eq!(plan.rows[0].position, RepeatPosition::new(0, 0));

        m.set_current_row(3);
        let plan = m.plan(&def, 1..2, 0..2, Viewport::new(100.0, 100.0), 5);
        assert_eq!(plan.rows[0].ordinal, 3);
        assert_eq!(plan.rows[0].position, RepeatPosition::new(0, 0));
        assert_eq!(plan.block_rows(0), 3..4);

        m.set_current_row(9);
        assert!(m.plan(&def, 1..2, 0..2, Viewport::new(100.0, 100.0), 5).rows.is_empty());
    }

    #[test]
    fn test_plan_is_idempotent() {
        let def = definition();
        let m = manager(RepeatOrientation::X, 2);
        let viewport = Viewport::new(100.0, 70.0).with_scroll(40.0);
        assert_eq!(
            m.plan(&def, 1..2, 0..2, viewport, 9),
            m.plan(&def, 1..2, 0..2, viewport, 9)
        );
    }
}
