//! Grid definitions: the tracks of both axes plus measurement.

use std::ops::Range;

use super::collection::GridDefinitionCollection;
use super::line::GridPointPlacement;
use super::track::{Axis, GridLength, GridTrack};
use super::track_set::TrackSet;
use crate::error::GridError;

/// A rectangular block of cells, in track ordinals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridRange {
    /// Column ordinals.
    pub columns: Range<usize>,
    /// Row ordinals.
    pub rows: Range<usize>,
}

impl GridRange {
    /// Create a range.
    pub fn new(columns: Range<usize>, rows: Range<usize>) -> Self {
        Self { columns, rows }
    }

    /// A single cell.
    pub fn cell(column: usize, row: usize) -> Self {
        Self::new(column..column + 1, row..row + 1)
    }

    /// The ordinals along `axis`.
    pub fn along(&self, axis: Axis) -> Range<usize> {
        match axis {
            Axis::Horizontal => self.columns.clone(),
            Axis::Vertical => self.rows.clone(),
        }
    }

    /// Whether the range covers no cell.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains(&self, other: &GridRange) -> bool {
        other.is_empty()
            || (self.columns.start <= other.columns.start
                && other.columns.end <= self.columns.end
                && self.rows.start <= other.rows.start
                && other.rows.end <= self.rows.end)
    }

    /// The tracks of `definition` covered along `axis`.
    pub fn track_set(
        &self,
        definition: &GridDefinition,
        axis: Axis,
    ) -> Result<TrackSet, GridError> {
        definition.track_set(axis, self.along(axis))
    }
}

/// The tracks of a grid.
///
/// Build with [`GridDefinition::builder`]; the builder seals both track
/// collections.
///
/// # Example
///
/// ```
/// use horizon_datagrid::grid::{Axis, GridDefinition, GridLength};
///
/// let mut grid = GridDefinition::builder()
///     .column(GridLength::Fixed(40.0))
///     .column(GridLength::Star(1.0))
///     .column(GridLength::Star(3.0))
///     .row(GridLength::Auto)
///     .build()
///     .unwrap();
///
/// assert_eq!(grid.measure(Axis::Horizontal, 200.0, 20.0), 200.0);
/// assert_eq!(grid.offset(Axis::Horizontal, 2), 80.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    columns: GridDefinitionCollection,
    rows: GridDefinitionCollection,
}

impl GridDefinition {
    /// Start describing a grid.
    pub fn builder() -> GridDefinitionBuilder {
        GridDefinitionBuilder::default()
    }

    /// Column tracks.
    pub fn columns(&self) -> &GridDefinitionCollection {
        &self.columns
    }

    /// Row tracks.
    pub fn rows(&self) -> &GridDefinitionCollection {
        &self.rows
    }

    /// Tracks of one axis.
    pub fn tracks(&self, axis: Axis) -> &GridDefinitionCollection {
        match axis {
            Axis::Horizontal => &self.columns,
            Axis::Vertical => &self.rows,
        }
    }

    fn tracks_mut(&mut self, axis: Axis) -> &mut GridDefinitionCollection {
        match axis {
            Axis::Horizontal => &mut self.columns,
            Axis::Vertical => &mut self.rows,
        }
    }

    /// Compute the measured length of every track along `axis`.
    ///
    /// Fixed tracks take their length and auto tracks take `auto_hint`.
    /// Star tracks split what is left of `available` in proportion to their
    /// weights; when nothing is left they measure zero. Returns the total
    /// measured extent, which exceeds `available` only when fixed and auto
    /// tracks alone do.
    pub fn measure(&mut self, axis: Axis, available: f32, auto_hint: f32) -> f32 {
        let tracks = self.tracks_mut(axis).tracks_mut();

        let mut committed = 0.0;
        let mut total_weight = 0.0;
        for track in tracks.iter() {
            match track.length() {
                GridLength::Fixed(len) => committed += len.max(0.0),
                GridLength::Auto => committed += auto_hint.max(0.0),
                GridLength::Star(weight) => total_weight += weight.max(0.0),
            }
        }

        let extra = (available - committed).max(0.0);

        let mut total = 0.0;
        for track in tracks.iter_mut() {
            let len = match track.length() {
                GridLength::Fixed(len) => len.max(0.0),
                GridLength::Auto => auto_hint.max(0.0),
                GridLength::Star(weight) if total_weight > 0.0 => {
                    extra * (weight.max(0.0) / total_weight)
                }
                GridLength::Star(_) => 0.0,
            };
            track.set_measured(len);
            total += len;
        }

        tracing::trace!(
            target: crate::logging::targets::LAYOUT,
            %axis,
            available,
            total,
            "measured tracks"
        );
        total
    }

    /// Distance from the grid origin to the start of the track with
    /// `ordinal`. Ordinals past the end yield the total extent.
    pub fn offset(&self, axis: Axis, ordinal: usize) -> f32 {
        self.tracks(axis)
            .iter()
            .take_while(|t| t.ordinal() < ordinal)
            .map(|t| t.measured())
            .sum()
    }

    /// Sum of the measured lengths of tracks with ordinals in `range`.
    pub fn extent(&self, axis: Axis, range: Range<usize>) -> f32 {
        self.tracks(axis)
            .iter()
            .filter(|t| range.contains(&t.ordinal()))
            .map(|t| t.measured())
            .sum()
    }

    /// Total measured extent along `axis`.
    pub fn total_extent(&self, axis: Axis) -> f32 {
        self.tracks(axis).iter().map(|t| t.measured()).sum()
    }

    /// The tracks with ordinals in `range`.
    pub fn track_set(&self, axis: Axis, range: Range<usize>) -> Result<TrackSet, GridError> {
        let tracks = self.tracks(axis);
        let tracks_in: Vec<GridTrack> = tracks
            .iter()
            .filter(|t| range.contains(&t.ordinal()))
            .copied()
            .collect();
        if tracks_in.len() != range.len() {
            return Err(GridError::RangeOutOfBounds {
                axis,
                start: range.start,
                end: range.end,
                len: tracks.len(),
            });
        }
        Ok(TrackSet::new(axis, tracks_in))
    }

    /// Which tracks around `point` fall inside `region` along `axis`.
    pub fn point_placement(
        &self,
        axis: Axis,
        point: usize,
        region: &GridRange,
    ) -> Result<GridPointPlacement, GridError> {
        Ok(self.track_set(axis, region.along(axis))?.point_placement(point))
    }
}

/// Builder for [`GridDefinition`].
#[derive(Debug)]
pub struct GridDefinitionBuilder {
    columns: GridDefinitionCollection,
    rows: GridDefinitionCollection,
    error: Option<GridError>,
}

impl Default for GridDefinitionBuilder {
    fn default() -> Self {
        Self {
            columns: GridDefinitionCollection::new(Axis::Horizontal),
            rows: GridDefinitionCollection::new(Axis::Vertical),
            error: None,
        }
    }
}

impl GridDefinitionBuilder {
    /// Append a column track.
    pub fn column(mut self, length: GridLength) -> Self {
        if let Err(err) = self.columns.push(length) {
            self.error.get_or_insert(err);
        }
        self
    }

    /// Append a row track.
    pub fn row(mut self, length: GridLength) -> Self {
        if let Err(err) = self.rows.push(length) {
            self.error.get_or_insert(err);
        }
        self
    }

    /// Seal both collections and produce the definition.
    pub fn build(mut self) -> Result<GridDefinition, GridError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.columns.seal();
        self.rows.seal();
        Ok(GridDefinition {
            columns: self.columns,
            rows: self.rows,
        })
    }
}
