//! Ordered, duplicate-free sets of tracks.

use std::ops::Range;

use super::line::GridPointPlacement;
use super::track::{Axis, GridTrack};

/// An ordinal-sorted set of tracks of one axis.
///
/// Track sets describe the footprint of a template along an axis. Layout
/// composes them with [`merge`](Self::merge) to find the repeat region.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSet {
    axis: Axis,
    tracks: Vec<GridTrack>,
}

impl TrackSet {
    /// An empty set.
    pub fn empty(axis: Axis) -> Self {
        Self {
            axis,
            tracks: Vec::new(),
        }
    }

    /// Build a set from arbitrary tracks.
    ///
    /// Tracks are sorted by ordinal; of several tracks with the same ordinal
    /// the first one given is kept.
    ///
    /// # Panics
    ///
    /// Panics if a track belongs to the other axis.
    pub fn new(axis: Axis, tracks: impl IntoIterator<Item = GridTrack>) -> Self {
        let mut tracks: Vec<GridTrack> = tracks
            .into_iter()
            .inspect(|t| {
                assert_eq!(t.axis(), axis, "track set of {axis} tracks given a {} track", t.axis())
            })
            .collect();
        tracks.sort_by_key(|t| t.ordinal());
        tracks.dedup_by_key(|t| t.ordinal());
        Self { axis, tracks }
    }

    /// Ordered union of two sets. When both contain a track with the same
    /// ordinal, the one from `x` is kept.
    ///
    /// # Panics
    ///
    /// Panics if the sets belong to different axes.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_datagrid::grid::{Axis, GridLength, GridTrack, TrackSet};
    ///
    /// let t = |o| GridTrack::new(Axis::Vertical, o, GridLength::Auto);
    /// let a = TrackSet::new(Axis::Vertical, [t(0), t(2)]);
    /// let b = TrackSet::new(Axis::Vertical, [t(1), t(2)]);
    ///
    /// let merged = TrackSet::merge(&a, &b);
    /// assert_eq!(merged.ordinals().collect::<Vec<_>>(), vec![0, 1, 2]);
    /// assert_eq!(TrackSet::merge(&a, &a), a);
    /// ```
    pub fn merge(x: &TrackSet, y: &TrackSet) -> TrackSet {
        assert_eq!(
            x.axis, y.axis,
            "cannot merge {} tracks with {} tracks",
            x.axis, y.axis
        );
        let mut tracks = Vec::with_capacity(x.tracks.len() + y.tracks.len());
        let (mut i, mut j) = (0, 0);
        while i < x.tracks.len() && j < y.tracks.len() {
            let (a, b) = (x.tracks[i], y.tracks[j]);
            match a.ordinal().cmp(&b.ordinal()) {
                std::cmp::Ordering::Less => {
                    tracks.push(a);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    tracks.push(b);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    tracks.push(a);
                    i += 1;
                    j += 1;
                }
            }
        }
        tracks.extend_from_slice(&x.tracks[i..]);
        tracks.extend_from_slice(&y.tracks[j..]);
        TrackSet {
            axis: x.axis,
            tracks,
        }
    }

    /// The axis of the set.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the set has no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterate over the tracks in ordinal order.
    pub fn iter(&self) -> std::slice::Iter<'_, GridTrack> {
        self.tracks.iter()
    }

    /// Iterate over the ordinals.
    pub fn ordinals(&self) -> impl Iterator<Item = usize> + '_ {
        self.tracks.iter().map(|t| t.ordinal())
    }

    /// Whether a track with `ordinal` is in the set.
    pub fn contains(&self, ordinal: usize) -> bool {
        self.tracks
            .binary_search_by_key(&ordinal, |t| t.ordinal())
            .is_ok()
    }

    /// Ordinal range from the first to one past the last track.
    pub fn span(&self) -> Option<Range<usize>> {
        match (self.tracks.first(), self.tracks.last()) {
            (Some(first), Some(last)) => Some(first.ordinal()..last.ordinal() + 1),
            _ => None,
        }
    }

    /// Whether the ordinals have no gaps.
    pub fn is_contiguous(&self) -> bool {
        self.tracks
            .windows(2)
            .all(|w| w[1].ordinal() == w[0].ordinal() + 1)
    }

    /// Sum of the measured lengths.
    pub fn measured_extent(&self) -> f32 {
        self.tracks.iter().map(|t| t.measured()).sum()
    }

    /// Which of the tracks around grid point `point` belong to this set.
    ///
    /// Point `p` lies between track `p - 1` and track `p`.
    pub fn point_placement(&self, point: usize) -> GridPointPlacement {
        let mut placement = GridPointPlacement::empty();
        if point > 0 && self.contains(point - 1) {
            placement |= GridPointPlacement::PREVIOUS_TRACK;
        }
        if self.contains(point) {
            placement |= GridPointPlacement::NEXT_TRACK;
        }
        placement
    }
}

impl<'a> IntoIterator for &'a TrackSet {
    type Item = &'a GridTrack;
    type IntoIter = std::slice::Iter<'a, GridTrack>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridLength;

    fn set(ordinals: &[usize]) -> TrackSet {
        TrackSet::new(
            Axis::Horizontal,
            ordinals
                .iter()
                .map(|&o| GridTrack::new(Axis::Horizontal, o, GridLength::Auto)),
        )
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let s = set(&[3, 1, 3, 2]);
        assert_eq!(s.ordinals().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(s.is_contiguous());
        assert_eq!(s.span(), Some(1..4));
    }

    #[test]
    fn test_merge_is_left_biased() {
        let a = TrackSet::new(
            Axis::Horizontal,
            [GridTrack::new(Axis::Horizontal, 1, GridLength::Fixed(5.0))],
        );
        let b = TrackSet::new(
            Axis::Horizontal,
            [GridTrack::new(Axis::Horizontal, 1, GridLength::Auto)],
        );
        assert_eq!(TrackSet::merge(&a, &b), a);
        assert_eq!(TrackSet::merge(&b, &a), b);
    }

    #[test]
    fn test_merge_with_empty() {
        let a = set(&[0, 4]);
        let e = TrackSet::empty(Axis::Horizontal);
        assert_eq!(TrackSet::merge(&a, &e), a);
        assert_eq!(TrackSet::merge(&e, &a), a);
        assert!(!TrackSet::merge(&a, &e).is_contiguous());
    }

    #[test]
    #[should_panic(expected = "cannot merge")]
    fn test_merge_axis_mismatch_panics() {
        let _ = TrackSet::merge(&set(&[0]), &TrackSet::empty(Axis::Vertical));
    }

    #[test]
    fn test_point_placement() {
        let s = set(&[1, 2]);
        assert_eq!(s.point_placement(0), GridPointPlacement::empty());
        assert_eq!(s.point_placement(1), GridPointPlacement::NEXT_TRACK);
        assert_eq!(s.point_placement(2), GridPointPlacement::BOTH);
        assert_eq!(s.point_placement(3), GridPointPlacement::PREVIOUS_TRACK);
        assert_eq!(s.point_placement(4), GridPointPlacement::empty());
    }
}
