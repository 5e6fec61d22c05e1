//! Flow and repeat geometry.
//!
//! Rows are grouped into blocks of `flow_count` rows. Within a block, rows
//! sit side by side along the flow axis; blocks advance along the main
//! (scrolling) axis. [`RepeatOrientation`] names the axis that rows fill
//! first:
//!
//! | Orientation | Flow axis | Main axis | Position of ordinal `n` |
//! |-------------|-----------|-----------|-------------------------|
//! | `Y`         | vertical  | horizontal | `(n / dim.y, n % dim.y)` |
//! | `X`         | horizontal | vertical  | `(n % dim.x, n / dim.x)` |
//! | `Z`         | none      | none      | `(0, 0)`                |
//!
//! Everything here is a pure function of its inputs.

mod geometry;

pub use geometry::{FlowMode, RepeatDimension, RepeatOrientation, RepeatPosition};
