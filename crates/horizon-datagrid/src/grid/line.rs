//! Grid lines and point placement flags.

use bitflags::bitflags;

use super::track::Axis;
use super::track_set::TrackSet;

bitflags! {
    /// Which track(s) a grid line belongs to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GridLinePosition: u8 {
        /// The line belongs to the track before its point.
        const PREVIOUS_TRACK = 0b01;
        /// The line belongs to the track after its point.
        const NEXT_TRACK = 0b10;
        /// The line belongs to both tracks.
        const BOTH = Self::PREVIOUS_TRACK.bits() | Self::NEXT_TRACK.bits();
    }
}

bitflags! {
    /// Which of the tracks around a grid point fall inside a region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GridPointPlacement: u8 {
        /// The track before the point is inside.
        const PREVIOUS_TRACK = 0b01;
        /// The track after the point is inside.
        const NEXT_TRACK = 0b10;
        /// Both tracks are inside.
        const BOTH = Self::PREVIOUS_TRACK.bits() | Self::NEXT_TRACK.bits();
    }
}

impl From<GridLinePosition> for GridPointPlacement {
    fn from(position: GridLinePosition) -> Self {
        GridPointPlacement::from_bits_truncate(position.bits())
    }
}

/// A separator drawn at a grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLine {
    /// Axis whose points the line sits on.
    pub axis: Axis,
    /// The point, between track `point - 1` and track `point`.
    pub point: usize,
    /// The track(s) the line belongs to.
    pub position: GridLinePosition,
}

impl GridLine {
    /// Create a line.
    pub fn new(axis: Axis, point: usize, position: GridLinePosition) -> Self {
        Self {
            axis,
            point,
            position,
        }
    }

    /// Whether the line belongs to a track of `region`.
    ///
    /// A line repeated with a region is one whose owning track lies inside
    /// it. Lines on the other axis never apply.
    pub fn applies_to(&self, region: &TrackSet) -> bool {
        region.axis() == self.axis
            && region
                .point_placement(self.point)
                .intersects(self.position.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridLength, GridTrack};

    fn region() -> TrackSet {
        TrackSet::new(
            Axis::Vertical,
            (2..4).map(|o| GridTrack::new(Axis::Vertical, o, GridLength::Auto)),
        )
    }

    #[test]
    fn test_both_is_union() {
        assert_eq!(
            GridLinePosition::BOTH,
            GridLinePosition::PREVIOUS_TRACK | GridLinePosition::NEXT_TRACK
        );
        assert_eq!(
            GridPointPlacement::from(GridLinePosition::NEXT_TRACK),
            GridPointPlacement::NEXT_TRACK
        );
    }

    #[test]
    fn test_applies_to_region_edges() {
        let r = region();
        // Top edge: only the next track is inside.
        assert!(GridLine::new(Axis::Vertical, 2, GridLinePosition::NEXT_TRACK).applies_to(&r));
        assert!(!GridLine::new(Axis::Vertical, 2, GridLinePosition::PREVIOUS_TRACK).applies_to(&r));
        // Bottom edge: only the previous track is inside.
        assert!(GridLine::new(Axis::Vertical, 4, GridLinePosition::PREVIOUS_TRACK).applies_to(&r));
        assert!(!GridLine::new(Axis::Vertical, 4, GridLinePosition::NEXT_TRACK).applies_to(&r));
        // Interior: anything applies.
        assert!(GridLine::new(Axis::Vertical, 3, GridLinePosition::BOTH).applies_to(&r));
        // Outside or wrong axis.
        assert!(!GridLine::new(Axis::Vertical, 0, GridLinePosition::BOTH).applies_to(&r));
        assert!(!GridLine::new(Axis::Horizontal, 3, GridLinePosition::BOTH).applies_to(&r));
    }
}
