//! Grid tracks and their sizing.

use std::fmt;

/// The axis a track runs along.
///
/// Horizontal tracks are the grid's columns, vertical tracks its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Column tracks, laid out left to right.
    Horizontal,
    /// Row tracks, laid out top to bottom.
    Vertical,
}

impl Axis {
    /// The other axis.
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "horizontal"),
            Axis::Vertical => write!(f, "vertical"),
        }
    }
}

/// How a track is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridLength {
    /// A fixed length in logical pixels.
    Fixed(f32),
    /// Sized from the content hint supplied at measure time.
    Auto,
    /// A proportional share of the space left after fixed and auto tracks.
    Star(f32),
}

impl GridLength {
    /// Whether this is a star length.
    pub fn is_star(&self) -> bool {
        matches!(self, GridLength::Star(_))
    }
}

impl Default for GridLength {
    fn default() -> Self {
        GridLength::Star(1.0)
    }
}

/// One row or column of the layout grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTrack {
    axis: Axis,
    ordinal: usize,
    length: GridLength,
    measured: f32,
}

impl GridTrack {
    /// Create an unmeasured track.
    pub fn new(axis: Axis, ordinal: usize, length: GridLength) -> Self {
        Self {
            axis,
            ordinal,
            length,
            measured: 0.0,
        }
    }

    /// The track's axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Position of the track along its axis.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The sizing spec.
    pub fn length(&self) -> GridLength {
        self.length
    }

    /// Length computed by the last measure pass.
    pub fn measured(&self) -> f32 {
        self.measured
    }

    pub(crate) fn set_measured(&mut self, measured: f32) {
        self.measured = measured;
    }
}
