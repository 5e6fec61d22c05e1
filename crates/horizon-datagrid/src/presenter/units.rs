use std::ops::Range;

use crate::data::RowKey;
use crate::elements::ElementId;
use crate::flow::RepeatPosition;
use crate::layout::UnitRect;
use crate::validation::InputError;

/// A materialized data row.
///
/// Keyed by [`RowKey`], so the same presenter follows its row while the
/// row stays in the window, whatever its ordinal does.
#[derive(Debug, Clone)]
pub struct RowPresenter {
    pub(crate) key: RowKey,
    pub(crate) ordinal: usize,
    pub(crate) block: usize,
    pub(crate) flow_index: usize,
    pub(crate) position: RepeatPosition,
    pub(crate) elements: Vec<ElementId>,
    pub(crate) rects: Vec<UnitRect>,
    pub(crate) input_errors: Vec<Option<InputError>>,
}

impl RowPresenter {
    pub(crate) fn new(key: RowKey, bindings: usize) -> Self {
        Self {
            key,
            ordinal: 0,
            block: 0,
            flow_index: 0,
            position: RepeatPosition::default(),
            elements: Vec::with_capacity(bindings),
            rects: vec![UnitRect::default(); bindings],
            input_errors: vec![None; bindings],
        }
    }

    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn block(&self) -> usize {
        self.block
    }

    pub fn flow_index(&self) -> usize {
        self.flow_index
    }

    pub fn position(&self) -> RepeatPosition {
        self.position
    }

    /// Element of the row binding at `binding`.
    pub fn element(&self, binding: usize) -> Option<ElementId> {
        self.elements.get(binding).copied()
    }

    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    pub fn rect(&self, binding: usize) -> Option<UnitRect> {
        self.rects.get(binding).copied()
    }

    /// Error left by the last failed edit through `binding`.
    pub fn input_error(&self, binding: usize) -> Option<&InputError> {
        self.input_errors.get(binding).and_then(Option::as_ref)
    }

    pub fn has_input_errors(&self) -> bool {
        self.input_errors.iter().any(Option::is_some)
    }
}

/// One flow slot of a scalar binding.
///
/// Scalar presenters are created with the grid presenter and live as long
/// as it does.
#[derive(Debug, Clone)]
pub struct ScalarPresenter {
    pub(crate) binding: usize,
    pub(crate) slot: usize,
    pub(crate) flow_index: isize,
    pub(crate) input_error: Option<InputError>,
    pub(crate) value_error: Option<InputError>,
    pub(crate) element: Option<ElementId>,
    pub(crate) rect: UnitRect,
}

impl ScalarPresenter {
    pub(crate) fn new(binding: usize, slot: usize) -> Self {
        Self {
            binding,
            slot,
            flow_index: -1,
            input_error: None,
            value_error: None,
            element: None,
            rect: UnitRect::default(),
        }
    }

    /// Index of the scalar binding in its template.
    pub fn binding(&self) -> usize {
        self.binding
    }

    /// Flow index this presenter shows, `-1` before the first layout.
    pub fn flow_index(&self) -> isize {
        self.flow_index
    }

    pub fn input_error(&self) -> Option<&InputError> {
        self.input_error.as_ref()
    }

    pub fn value_error(&self) -> Option<&InputError> {
        self.value_error.as_ref()
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn rect(&self) -> UnitRect {
        self.rect
    }

    pub(crate) fn assign(&mut self, flow_index: usize) {
        let flow_index = flow_index as isize;
        if self.flow_index != flow_index {
            self.flow_index = flow_index;
            self.input_error = None;
            self.value_error = None;
        }
    }
}

/// A materialized block of rows.
#[derive(Debug, Clone)]
pub struct BlockPresenter {
    pub(crate) ordinal: usize,
    pub(crate) position: RepeatPosition,
    pub(crate) rows: Range<usize>,
    pub(crate) elements: Vec<ElementId>,
    pub(crate) rects: Vec<UnitRect>,
}

impl BlockPresenter {
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn position(&self) -> RepeatPosition {
        self.position
    }

    /// Ordinals of the rows in the block.
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    pub fn element(&self, binding: usize) -> Option<ElementId> {
        self.elements.get(binding).copied()
    }

    pub fn rect(&self, binding: usize) -> Option<UnitRect> {
        self.rects.get(binding).copied()
    }
}
