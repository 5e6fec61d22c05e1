use std::ops::Range;

use crate::binding::{Binding, BlockBinding, RowBinding, ScalarBinding, Template};
use crate::error::GridError;
use crate::flow::{FlowMode, RepeatOrientation};
use crate::grid::{Axis, GridDefinition, GridLine, TrackSet};

pub type RowTemplate = Template<RowBinding>;
pub type ScalarTemplate = Template<ScalarBinding>;
pub type BlockTemplate = Template<BlockBinding>;

/// Everything a [`GridPresenter`](super::GridPresenter) lays out: the grid,
/// the per-row, per-scalar and per-block bindings, and the separators.
#[derive(Debug, Clone)]
pub struct GridTemplate {
    definition: GridDefinition,
    rows: RowTemplate,
    scalars: ScalarTemplate,
    blocks: BlockTemplate,
    lines: Vec<GridLine>,
}

/// The tracks a template repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Regions {
    pub(crate) repeat: Range<usize>,
    pub(crate) flow: Range<usize>,
}

impl GridTemplate {
    pub fn new(definition: GridDefinition) -> Self {
        Self {
            definition,
            rows: RowTemplate::default(),
            scalars: ScalarTemplate::default(),
            blocks: BlockTemplate::default(),
            lines: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: RowTemplate) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_scalars(mut self, scalars: ScalarTemplate) -> Self {
        self.scalars = scalars;
        self
    }

    pub fn with_blocks(mut self, blocks: BlockTemplate) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_lines(mut self, lines: impl IntoIterator<Item = GridLine>) -> Self {
        self.lines.extend(lines);
        self
    }

    pub fn definition(&self) -> &GridDefinition {
        &self.definition
    }

    pub(crate) fn definition_mut(&mut self) -> &mut GridDefinition {
        &mut self.definition
    }

    pub fn rows(&self) -> &RowTemplate {
        &self.rows
    }

    pub fn scalars(&self) -> &ScalarTemplate {
        &self.scalars
    }

    pub fn blocks(&self) -> &BlockTemplate {
        &self.blocks
    }

    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    /// Tracks along `axis` repeated per block: the merge of every row and
    /// block binding's tracks.
    pub fn repeat_region(&self, axis: Axis) -> Result<TrackSet, GridError> {
        let rows = self.rows.iter().map(|b| b.range().track_set(&self.definition, axis));
        let blocks = self.blocks.iter().map(|b| b.range().track_set(&self.definition, axis));
        rows.chain(blocks)
            .try_fold(TrackSet::empty(axis), |acc, set| Ok(TrackSet::merge(&acc, &set?)))
    }

    /// Tracks along `axis` repeated per row of a block.
    pub fn flow_region(&self, axis: Axis) -> Result<TrackSet, GridError> {
        self.rows
            .iter()
            .map(|b| b.range().track_set(&self.definition, axis))
            .try_fold(TrackSet::empty(axis), |acc, set| Ok(TrackSet::merge(&acc, &set?)))
    }

    /// Separators along `axis` that repeat with the region.
    pub fn repeat_lines(&self, axis: Axis) -> Result<Vec<GridLine>, GridError> {
        let region = self.repeat_region(axis)?;
        Ok(self
            .lines
            .iter()
            .filter(|line| line.applies_to(&region))
            .copied()
            .collect())
    }

    /// Check the template against `orientation` and resolve its regions.
    pub(crate) fn regions(&self, orientation: RepeatOrientation) -> Result<Regions, GridError> {
        let main = orientation.main_axis().unwrap_or(Axis::Vertical);
        let flow = main.cross();

        for child in self.scalars.children() {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                child.binding().range().track_set(&self.definition, axis)?;
            }
        }

        let repeat = self.repeat_region(main)?;
        if !repeat.is_contiguous() {
            return Err(GridError::DiscontiguousRegion { axis: main });
        }
        let repeat = repeat.span().unwrap_or(0..0);
        if orientation != RepeatOrientation::Z {
            for child in self.scalars.children() {
                let along = child.binding().range().along(main);
                if along.start < repeat.end && repeat.start < along.end {
                    return Err(GridError::ScalarInRepeatRegion {
                        name: child.name().to_string(),
                    });
                }
            }
        }

        let flow_set = self.flow_region(flow)?;
        if !flow_set.is_contiguous() {
            return Err(GridError::DiscontiguousRegion { axis: flow });
        }
        let flow_span = flow_set.span().unwrap_or(0..0);
        if orientation != RepeatOrientation::Z && !flow_span.is_empty() {
            // Repeated scalars tile with the flow slots, so they must sit inside them.
            for child in self.scalars.children() {
                let binding = child.binding();
                let along = binding.range().along(flow);
                if binding.mode() == FlowMode::Repeat
                    && (along.start < flow_span.start || along.end > flow_span.end)
                {
                    return Err(GridError::ScalarOutsideFlowRegion {
                        name: child.name().to_string(),
                    });
                }
            }
        }
        Ok(Regions {
            repeat,
            flow: flow_span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::TemplateBuilder;
    use crate::data::ColumnId;
    use crate::grid::{GridLength, GridLinePosition, GridRange};
    use crate::view::{ElementKind, ElementSpec};

    fn definition() -> GridDefinition {
        let mut b = GridDefinition::builder();
        for _ in 0..3 {
            b = b.column(GridLength::Fixed(10.0)).row(GridLength::Fixed(10.0));
        }
        b.build().unwrap()
    }

    fn text() -> ElementSpec {
        ElementSpec::simple(ElementKind("text"), "text")
    }

    fn row(cell: GridRange) -> RowBinding {
        RowBinding::column(text(), cell, "text", ColumnId(0))
    }

    #[test]
    fn test_regions_merge_row_bindings() {
        let template = GridTemplate::new(definition())
            .with_rows(
                TemplateBuilder::new()
                    .add_child(row(GridRange::cell(0, 1)), "a")
                    .add_child(row(GridRange::cell(1, 1)), "b")
                    .build(),
            )
            .with_lines([
                GridLine::new(Axis::Vertical, 1, GridLinePosition::NEXT_TRACK),
                GridLine::new(Axis::Vertical, 1, GridLinePosition::PREVIOUS_TRACK),
                GridLine::new(Axis::Vertical, 2, GridLinePosition::PREVIOUS_TRACK),
            ]);
        let regions = template.regions(RepeatOrientation::X).unwrap();
        assert_eq!(regions, Regions { repeat: 1..2, flow: 0..2 });
        let lines = template.repeat_lines(Axis::Vertical).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines
            .iter()
            .all(|l| l.position != GridLinePosition::PREVIOUS_TRACK || l.point == 2));
    }

    #[test]
    fn test_gap_in_region_is_rejected() {
        let template = GridTemplate::new(definition()).with_rows(
            TemplateBuilder::new()
                .add_child(row(GridRange::cell(0, 0)), "a")
                .add_child(row(GridRange::cell(0, 2)), "b")
                .build(),
        );
        assert_eq!(
            template.regions(RepeatOrientation::X),
            Err(GridError::DiscontiguousRegion { axis: Axis::Vertical })
        );
    }

    #[test]
    fn test_scalar_overlapping_region_is_rejected() {
        let mut store = crate::binding::ScalarStore::new();
        let id = store.insert("total", crate::data::Value::Int(0));
        let template = GridTemplate::new(definition())
            .with_rows(TemplateBuilder::new().add_child(row(GridRange::cell(0, 1)), "a").build())
            .with_scalars(
                TemplateBuilder::new()
                    .add_child(
                        ScalarBinding::new(text(), GridRange::cell(2, 1), "text", id),
                        "total",
                    )
                    .build(),
            );
        assert!(matches!(
            template.regions(RepeatOrientation::X),
            Err(GridError::ScalarInRepeatRegion { name }) if name == "total"
        ));
        assert!(template.regions(RepeatOrientation::Z).is_ok());
    }

    #[test]
    fn test_repeated_scalar_outside_flow_region_is_rejected() {
        let mut store = crate::binding::ScalarStore::new();
        let id = store.insert("total", crate::data::Value::Int(0));
        let scalar = |binding: ScalarBinding| {
            GridTemplate::new(definition())
                .with_rows(
                    TemplateBuilder::new()
                        .add_child(row(GridRange::cell(0, 1)), "a")
                        .build(),
                )
                .with_scalars(TemplateBuilder::new().add_child(binding, "total").build())
        };

        let outside = scalar(ScalarBinding::new(text(), GridRange::cell(2, 0), "text", id));
        assert!(matches!(
            outside.regions(RepeatOrientation::X),
            Err(GridError::ScalarOutsideFlowRegion { name }) if name == "total"
        ));
        assert!(outside.regions(RepeatOrientation::Z).is_ok());

        let stretched =
            scalar(ScalarBinding::new(text(), GridRange::cell(2, 0), "text", id).stretch());
        assert!(stretched.regions(RepeatOrientation::X).is_ok());
        let inside = scalar(ScalarBinding::new(text(), GridRange::cell(0, 0), "text", id));
        assert!(inside.regions(RepeatOrientation::X).is_ok());
    }

    #[test]
    fn test_out_of_bounds_binding() {
        let template = GridTemplate::new(definition())
            .with_rows(TemplateBuilder::new().add_child(row(GridRange::cell(5, 0)), "a").build());
        assert!(matches!(
            template.regions(RepeatOrientation::X),
            Err(GridError::RangeOutOfBounds { .. })
        ));
    }
}
