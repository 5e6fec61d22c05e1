//! The layout grid: tracks, track sets, lines and measurement.

mod collection;
mod definition;
mod line;
mod track;
mod track_set;

pub use collection::GridDefinitionCollection;
pub use definition::{GridDefinition, GridDefinitionBuilder, GridRange};
pub use line::{GridLine, GridLinePosition, GridPointPlacement};
pub use track::{Axis, GridLength, GridTrack};
pub use track_set::TrackSet;
