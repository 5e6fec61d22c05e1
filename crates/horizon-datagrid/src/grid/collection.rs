//! Append-only, sealable track collections.

use std::ops::Index;

use super::track::{Axis, GridLength, GridTrack};
use crate::error::GridError;

/// The tracks of one axis of a grid definition.
///
/// Tracks are appended in strictly increasing ordinal order while the grid
/// is being described; once [`seal`](Self::seal)ed the membership never
/// changes. Measured lengths are still updated by layout passes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinitionCollection {
    axis: Axis,
    tracks: Vec<GridTrack>,
    sealed: bool,
}

impl GridDefinitionCollection {
    /// Create an empty, unsealed collection.
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            tracks: Vec::new(),
            sealed: false,
        }
    }

    /// The axis of every track in this collection.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Append a track.
    ///
    /// Fails when the collection is sealed, when the track belongs to the
    /// other axis, or when its ordinal does not follow the last one.
    pub fn add(&mut self, track: GridTrack) -> Result<(), GridError> {
        if self.sealed {
            return Err(GridError::Sealed { axis: self.axis });
        }
        if track.axis() != self.axis {
            return Err(GridError::AxisMismatch {
                expected: self.axis,
                got: track.axis(),
            });
        }
        if let Some(last) = self.tracks.last()
            && track.ordinal() <= last.ordinal()
        {
            return Err(GridError::OrdinalOutOfOrder {
                axis: self.axis,
                ordinal: track.ordinal(),
                last: last.ordinal(),
            });
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Append a track at the next ordinal and return that ordinal.
    pub fn push(&mut self, length: GridLength) -> Result<usize, GridError> {
        let ordinal = self.tracks.last().map_or(0, |t| t.ordinal() + 1);
        self.add(GridTrack::new(self.axis, ordinal, length))?;
        Ok(ordinal)
    }

    /// Make the collection read-only. Returns `self` for chaining.
    pub fn seal(&mut self) -> &mut Self {
        self.sealed = true;
        self
    }

    /// Whether [`seal`](Self::seal) has been called.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether there are no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index` (position, not ordinal).
    pub fn get(&self, index: usize) -> Option<&GridTrack> {
        self.tracks.get(index)
    }

    /// Track with the given ordinal.
    pub fn by_ordinal(&self, ordinal: usize) -> Option<&GridTrack> {
        self.tracks
            .binary_search_by_key(&ordinal, |t| t.ordinal())
            .ok()
            .map(|i| &self.tracks[i])
    }

    /// Iterate over the tracks in ordinal order.
    pub fn iter(&self) -> std::slice::Iter<'_, GridTrack> {
        self.tracks.iter()
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut [GridTrack] {
        &mut self.tracks
    }
}

impl Index<usize> for GridDefinitionCollection {
    type Output = GridTrack;

    fn index(&self, index: usize) -> &GridTrack {
        &self.tracks[index]
    }
}

impl<'a> IntoIterator for &'a GridDefinitionCollection {
    type Item = &'a GridTrack;
    type IntoIter = std::slice::Iter<'a, GridTrack>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_ordinals() {
        let mut cols = GridDefinitionCollection::new(Axis::Horizontal);
        assert_eq!(cols.push(GridLength::Fixed(10.0)), Ok(0));
        assert_eq!(cols.push(GridLength::Auto), Ok(1));
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[1].length(), GridLength::Auto);
    }

    #[test]
    fn test_add_rejects_out_of_order() {
        let mut rows = GridDefinitionCollection::new(Axis::Vertical);
        rows.add(GridTrack::new(Axis::Vertical, 3, GridLength::Auto))
            .unwrap();
        assert_eq!(
            rows.add(GridTrack::new(Axis::Vertical, 3, GridLength::Auto)),
            Err(GridError::OrdinalOutOfOrder {
                axis: Axis::Vertical,
                ordinal: 3,
                last: 3
            })
        );
        assert!(matches!(
            rows.add(GridTrack::new(Axis::Horizontal, 4, GridLength::Auto)),
            Err(GridError::AxisMismatch { .. })
        ));
        assert_eq!(rows.by_ordinal(3).map(|t| t.ordinal()), Some(3));
        assert!(rows.by_ordinal(0).is_none());
    }

    #[test]
    fn test_sealed_rejects_add() {
        let mut cols = GridDefinitionCollection::new(Axis::Horizontal);
        cols.push(GridLength::Star(1.0)).unwrap();
        cols.seal();
        assert!(cols.is_sealed());
        assert_eq!(
            cols.push(GridLength::Star(1.0)),
            Err(GridError::Sealed {
                axis: Axis::Horizontal
            })
        );
        assert_eq!(cols.len(), 1);
    }
}
