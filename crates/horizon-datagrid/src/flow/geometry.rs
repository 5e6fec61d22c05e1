use crate::grid::Axis;

/// The order in which repeated units fill the repeat region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RepeatOrientation {
    /// Top to bottom, then the next column.
    Y,
    /// Left to right, then the next row.
    #[default]
    X,
    /// A single current unit, no repetition.
    Z,
}

impl RepeatOrientation {
    /// The axis blocks advance along, or `None` for `Z`.
    pub fn main_axis(self) -> Option<Axis> {
        match self {
            RepeatOrientation::Y => Some(Axis::Horizontal),
            RepeatOrientation::X => Some(Axis::Vertical),
            RepeatOrientation::Z => None,
        }
    }

    /// The axis rows of one block are laid out along, or `None` for `Z`.
    pub fn flow_axis(self) -> Option<Axis> {
        self.main_axis().map(Axis::cross)
    }

    /// The repeat dimension for blocks of `flow_count` rows, `blocks` deep.
    ///
    /// # Panics
    ///
    /// Panics if `flow_count` is zero.
    pub fn dimension(self, flow_count: usize, blocks: usize) -> RepeatDimension {
        assert!(flow_count > 0, "flow count must be at least 1");
        match self {
            RepeatOrientation::Y => RepeatDimension::new(blocks, flow_count),
            RepeatOrientation::X => RepeatDimension::new(flow_count, blocks),
            RepeatOrientation::Z => RepeatDimension::new(1, 1),
        }
    }

    /// Position of the unit with `ordinal` in a region of `dimension`.
    ///
    /// # Panics
    ///
    /// Panics if the dimension along the fill axis is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_datagrid::flow::{RepeatDimension, RepeatOrientation, RepeatPosition};
    ///
    /// let dim = RepeatDimension::new(2, 3);
    /// assert_eq!(RepeatOrientation::Y.position(4, dim), RepeatPosition::new(1, 1));
    /// assert_eq!(RepeatOrientation::X.position(4, dim), RepeatPosition::new(0, 2));
    /// assert_eq!(RepeatOrientation::Z.position(4, dim), RepeatPosition::new(0, 0));
    /// ```
    pub fn position(self, ordinal: usize, dimension: RepeatDimension) -> RepeatPosition {
        match self {
            RepeatOrientation::Y => {
                assert!(dimension.y > 0, "repeat dimension y must be non-zero for orientation Y");
                RepeatPosition::new(ordinal / dimension.y, ordinal % dimension.y)
            }
            RepeatOrientation::X => {
                assert!(dimension.x > 0, "repeat dimension x must be non-zero for orientation X");
                RepeatPosition::new(ordinal % dimension.x, ordinal / dimension.x)
            }
            RepeatOrientation::Z => RepeatPosition::new(0, 0),
        }
    }

    /// Split a row ordinal into `(block, flow_index)`.
    ///
    /// # Panics
    ///
    /// Panics if `flow_count` is zero.
    pub fn split(self, ordinal: usize, flow_count: usize) -> (usize, usize) {
        assert!(flow_count > 0, "flow count must be at least 1");
        match self {
            RepeatOrientation::Z => (0, 0),
            _ => (ordinal / flow_count, ordinal % flow_count),
        }
    }
}

/// The extent of a repeat region, in units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RepeatDimension {
    /// Units across.
    pub x: usize,
    /// Units down.
    pub y: usize,
}

impl RepeatDimension {
    /// Create a dimension.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Number of unit slots.
    pub fn area(&self) -> usize {
        self.x * self.y
    }
}

/// A unit's position within a repeat region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RepeatPosition {
    /// Column of the unit.
    pub x: usize,
    /// Row of the unit.
    pub y: usize,
}

impl RepeatPosition {
    /// Create a position.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// How a scalar is replicated along the flow axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowMode {
    /// One instance per flow index.
    #[default]
    Repeat,
    /// A single instance spanning the whole flow axis.
    Stretch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_y_fills_down_first() {
        let dim = RepeatDimension::new(2, 3);
        let positions: Vec<_> = (0..6)
            .map(|n| RepeatOrientation::Y.position(n, dim))
            .map(|p| (p.x, p.y))
            .collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_orientation_x_fills_across_first() {
        let dim = RepeatDimension::new(2, 3);
        let positions: Vec<_> = (0..6)
            .map(|n| RepeatOrientation::X.position(n, dim))
            .map(|p| (p.x, p.y))
            .collect();
        assert_eq!(positions, vec![(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_orientation_z_is_origin() {
        let dim = RepeatOrientation::Z.dimension(4, 10);
        assert_eq!(dim, RepeatDimension::new(1, 1));
        for n in 0..5 {
            assert_eq!(RepeatOrientation::Z.position(n, dim), RepeatPosition::default());
        }
    }

    #[test]
    fn test_dimension_and_split_agree_with_position() {
        for orientation in [RepeatOrientation::X, RepeatOrientation::Y] {
            let dim = orientation.dimension(3, 4);
            assert_eq!(dim.area(), 12);
            for n in 0..12 {
                let (block, flow) = orientation.split(n, 3);
                let p = orientation.position(n, dim);
                let expected = match orientation {
                    RepeatOrientation::X => RepeatPosition::new(flow, block),
                    _ => RepeatPosition::new(block, flow),
                };
                assert_eq!(p, expected);
            }
        }
    }

    #[test]
    fn test_axes() {
        assert_eq!(RepeatOrientation::X.main_axis(), Some(Axis::Vertical));
        assert_eq!(RepeatOrientation::Y.flow_axis(), Some(Axis::Vertical));
        assert_eq!(RepeatOrientation::Z.main_axis(), None);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_zero_dimension_panics() {
        RepeatOrientation::Y.position(1, RepeatDimension::new(2, 0));
    }
}
