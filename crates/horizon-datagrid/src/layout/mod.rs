//! Virtualization and placement.
//!
//! [`LayoutManager::plan`] turns a measured [`GridDefinition`](crate::grid::GridDefinition),
//! the repeat and flow regions of a template, a [`Viewport`] and a row count
//! into a [`LayoutPlan`]: which blocks and rows are materialized, where each
//! sits in the repeat region, and the rectangle of every bound element.

mod manager;
mod plan;

pub use manager::LayoutManager;
pub use plan::{LayoutPlan, RowPlacement};

/// The visible part of the content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Scroll offset along the main axis.
    pub scroll: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll: 0.0,
        }
    }

    pub fn with_scroll(mut self, scroll: f32) -> Self {
        self.scroll = scroll;
        self
    }

    /// Length along `axis`.
    pub fn length(&self, axis: crate::grid::Axis) -> f32 {
        match axis {
            crate::grid::Axis::Horizontal => self.width,
            crate::grid::Axis::Vertical => self.height,
        }
    }
}

/// Where an element is placed, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl UnitRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}
