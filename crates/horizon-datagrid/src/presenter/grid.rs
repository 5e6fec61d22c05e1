use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use horizon_datagrid_core::{ConnectionGuard, ThreadAffinity, ThreadPool, UiQueue, UiSender};

use super::template::{GridTemplate, Regions};
use super::units::{BlockPresenter, RowPresenter, ScalarPresenter};
use crate::binding::{AttachContext, Binding, BlockContext, PendingEdit, ScalarId, ScalarStore};
use crate::config::GridConfig;
use crate::data::{ColumnId, DataChange, DataSource, RowKey, Value};
use crate::elements::{ElementId, ElementsManager};
use crate::error::{DataError, Result};
use crate::flow::FlowMode;
use crate::layout::{LayoutManager, LayoutPlan, Viewport};
use crate::logging::{PerfSpan, span_names, targets};
use crate::validation::{
    AsyncValidatorGroup, MessageGroup, MessageKind, MessageSource, ValidationEngine,
    ValidationMessage,
};
use crate::view::{Element, Owner};

/// The errors of one row, kept apart by origin.
#[derive(Debug, Clone, PartialEq)]
pub struct RowErrors {
    /// Failed edits, one per binding, sourced to the edited element.
    pub input: Vec<ValidationMessage>,
    /// Async validator results in registration order.
    pub validation: MessageGroup,
}

impl RowErrors {
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.validation.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.input.is_empty() || self.validation.has_errors()
    }
}

/// Presents a [`DataSource`] through a [`GridTemplate`].
///
/// The presenter is UI-affine. Every method runs on the thread that created
/// it; data sources may change from anywhere, their notifications are
/// queued and applied on the next [`layout`](Self::layout) or
/// [`flush_edits`](Self::flush_edits).
///
/// A pass over the same viewport and data materializes the same units with
/// the same elements at the same places.
pub struct GridPresenter<D: DataSource> {
    data: Arc<D>,
    template: GridTemplate,
    regions: Regions,
    layout: LayoutManager,
    elements: ElementsManager,
    auto_capacity: bool,
    scalars: ScalarStore,
    validation: ValidationEngine,
    rows: HashMap<RowKey, RowPresenter>,
    scalar_presenters: Vec<ScalarPresenter>,
    blocks: BTreeMap<usize, BlockPresenter>,
    blocks_dirty: bool,
    edits: UiQueue<PendingEdit>,
    edit_sender: UiSender<PendingEdit>,
    changes: UiQueue<DataChange>,
    _connection: ConnectionGuard<DataChange>,
    viewport: Viewport,
    plan: Option<LayoutPlan>,
    affinity: ThreadAffinity,
}

impl<D: DataSource> GridPresenter<D> {
    /// Create a presenter. Nothing is materialized until the first
    /// [`layout`](Self::layout).
    ///
    /// Fails if the template does not fit the configured orientation or
    /// the validator pool cannot be started.
    pub fn new(
        data: Arc<D>,
        template: GridTemplate,
        scalars: ScalarStore,
        validators: AsyncValidatorGroup,
        config: GridConfig,
    ) -> Result<Self> {
        let regions = template.regions(config.orientation)?;
        let layout = LayoutManager::new(&config);
        let pool = ThreadPool::new(config.thread_pool.clone())?;

        let changes = UiQueue::unbounded();
        let sender = changes.sender();
        let connection = data.signals().changed.connect_scoped(move |change: &DataChange| {
            if let Err(err) = sender.send(change.clone()) {
                tracing::warn!(target: targets::PRESENTER, %err, "dropped data change");
            }
        });

        let scalar_presenters = template
            .scalars()
            .iter()
            .enumerate()
            .flat_map(|(index, binding)| {
                let slots = match binding.mode() {
                    FlowMode::Repeat => layout.flow_count(),
                    FlowMode::Stretch => 1,
                };
                (0..slots).map(move |slot| ScalarPresenter::new(index, slot))
            })
            .collect();

        let edits = UiQueue::unbounded();
        let edit_sender = edits.sender();
        tracing::debug!(
            target: targets::PRESENTER,
            orientation = ?config.orientation,
            flow_count = layout.flow_count(),
            repeat = ?regions.repeat,
            flow = ?regions.flow,
            "created grid presenter"
        );

        Ok(Self {
            data,
            template,
            regions,
            layout,
            elements: ElementsManager::new(config.pool_capacity.unwrap_or(usize::MAX)),
            auto_capacity: config.pool_capacity.is_none(),
            scalars,
            validation: ValidationEngine::new(validators, pool),
            rows: HashMap::new(),
            scalar_presenters,
            blocks: BTreeMap::new(),
            blocks_dirty: false,
            edits,
            edit_sender,
            changes,
            _connection: connection,
            viewport: Viewport::default(),
            plan: None,
            affinity: ThreadAffinity::current(),
        })
    }

    // =========================================================================
    // Passes
    // =========================================================================

    /// Apply queued data changes and lay out for `viewport`.
    pub fn layout(&mut self, viewport: Viewport) {
        self.affinity.debug_assert_same_thread();
        let _span = PerfSpan::new(span_names::LAYOUT_PASS);
        self.viewport = viewport;
        self.process_changes(false);
        self.relayout();
    }

    /// Write queued user edits back. Returns the number of edits applied.
    ///
    /// Edits made through an element that has since been detached or
    /// reassigned are dropped.
    pub fn flush_edits(&mut self) -> usize {
        self.affinity.debug_assert_same_thread();
        let _span = PerfSpan::new(span_names::FLUSH_EDITS);
        let mut applied = 0;
        for edit in self.edits.drain() {
            let current = self
                .elements
                .get(edit.element)
                .map(|e| (e.owner(), e.generation()));
            if current != Some((Some(edit.owner), edit.generation)) {
                tracing::warn!(
                    target: targets::BINDING,
                    element = ?edit.element,
                    owner = ?edit.owner,
                    "dropped edit from a recycled element"
                );
                continue;
            }
            match edit.owner {
                Owner::Row(key) => self.apply_row_edit(key, &edit),
                Owner::Scalar { binding, slot } => self.apply_scalar_edit(binding, slot, &edit),
                Owner::Block(_) => {
                    tracing::warn!(target: targets::BINDING, "block bindings do not accept input");
                    continue;
                }
            }
            applied += 1;
        }
        self.process_changes(true);
        applied
    }

    /// Merge finished validator runs. Returns the number merged.
    pub fn pump_validation(&mut self) -> usize {
        self.affinity.debug_assert_same_thread();
        let _span = PerfSpan::new(span_names::VALIDATION_PUMP);
        self.validation.pump()
    }

    /// Merge validator runs until none is in flight or `timeout` elapses.
    pub fn wait_for_validation(&mut self, timeout: Duration) -> usize {
        self.affinity.debug_assert_same_thread();
        let _span = PerfSpan::new(span_names::VALIDATION_PUMP);
        self.validation.pump_until_idle(timeout)
    }

    /// Run every validator for the row with `key`. Returns the number of
    /// runs started.
    pub fn revalidate(&mut self, key: RowKey) -> usize {
        self.request_validation(key, None)
    }

    /// Run every validator for every row.
    pub fn revalidate_all(&mut self) -> usize {
        (0..self.data.row_count())
            .map(|ordinal| self.request_validation_at(ordinal, None))
            .sum()
    }

    /// Apply queued data changes and push current values to every attached
    /// element. Structural changes re-run the last layout.
    pub fn refresh(&mut self) {
        self.affinity.debug_assert_same_thread();
        self.process_changes(true);
        for presenter in self.rows.values() {
            let Some(ordinal) = self.data.ordinal_of(presenter.key) else {
                continue;
            };
            for (binding, id) in self.template.rows().iter().zip(&presenter.elements) {
                if let Some(element) = self.elements.get_mut(*id) {
                    binding.refresh(element, binding.read(&*self.data, ordinal));
                }
            }
        }
        self.blocks_dirty = true;
        self.refresh_blocks();
        self.refresh_scalars(None);
    }

    /// Show the row at `ordinal` in the `Z` orientation.
    pub fn set_current_row(&mut self, ordinal: usize) {
        self.layout.set_current_row(ordinal);
        if self.plan.is_some() {
            self.relayout();
        }
    }

    /// Store a scalar value and update its elements.
    pub fn set_scalar(
        &mut self,
        id: ScalarId,
        value: Value,
    ) -> std::result::Result<bool, DataError> {
        let changed = self.scalars.set(id, value)?;
        if changed {
            self.refresh_scalars(Some(id));
        }
        Ok(changed)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn data(&self) -> &Arc<D> {
        &self.data
    }

    pub fn template(&self) -> &GridTemplate {
        &self.template
    }

    pub fn scalars(&self) -> &ScalarStore {
        &self.scalars
    }

    pub fn validation(&self) -> &ValidationEngine {
        &self.validation
    }

    pub fn elements(&self) -> &ElementsManager {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// The last layout plan.
    pub fn plan(&self) -> Option<&LayoutPlan> {
        self.plan.as_ref()
    }

    pub fn current_row(&self) -> usize {
        self.layout.current_row()
    }

    pub fn row(&self, key: RowKey) -> Option<&RowPresenter> {
        self.rows.get(&key)
    }

    /// Materialized rows in ordinal order.
    pub fn rows(&self) -> Vec<&RowPresenter> {
        let mut rows: Vec<_> = self.rows.values().collect();
        rows.sort_by_key(|p| p.ordinal);
        rows
    }

    pub fn scalar_presenters(&self) -> &[ScalarPresenter] {
        &self.scalar_presenters
    }

    pub fn scalar_presenter(&self, binding: usize, slot: usize) -> Option<&ScalarPresenter> {
        self.scalar_presenters
            .iter()
            .find(|p| p.binding == binding && p.slot == slot)
    }

    pub fn block(&self, ordinal: usize) -> Option<&BlockPresenter> {
        self.blocks.get(&ordinal)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BlockPresenter> {
        self.blocks.values()
    }

    /// Input errors and validation messages of the row with `key`.
    pub fn row_errors(&self, key: RowKey) -> RowErrors {
        let input = self
            .rows
            .get(&key)
            .map(|p| {
                p.input_errors
                    .iter()
                    .zip(&p.elements)
                    .filter_map(|(err, id)| {
                        err.as_ref().map(|e| {
                            e.to_message(MessageKind::RowInput, Some(MessageSource::Element(*id)))
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        RowErrors {
            input,
            validation: self.validation.messages(key),
        }
    }

    /// Input and value errors of one scalar presenter.
    pub fn scalar_errors(&self, binding: usize, slot: usize) -> Vec<ValidationMessage> {
        let Some(presenter) = self.scalar_presenter(binding, slot) else {
            return Vec::new();
        };
        let mut messages = Vec::new();
        if let Some(err) = &presenter.input_error {
            let source = presenter.element.map(MessageSource::Element);
            messages.push(err.to_message(MessageKind::ScalarInput, source));
        }
        let binding = self.template.scalars().get(binding);
        if let (Some(err), Some(b)) = (&presenter.value_error, binding) {
            let source = Some(MessageSource::Scalar(b.scalar()));
            messages.push(err.to_message(MessageKind::Validation, source));
        }
        messages
    }

    /// Whether any row of the materialized block has an error.
    pub fn block_has_errors(&self, block: usize) -> bool {
        let Some(presenter) = self.blocks.get(&block) else {
            return false;
        };
        presenter
            .rows
            .clone()
            .filter_map(|ordinal| self.data.row_key(ordinal))
            .any(|key| self.row_errors(key).has_errors())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn relayout(&mut self) {
        self.layout.measure(self.template.definition_mut(), self.viewport);
        let plan = self.layout.plan(
            self.template.definition(),
            self.regions.repeat.clone(),
            self.regions.flow.clone(),
            self.viewport,
            self.data.row_count(),
        );

        let wanted: HashMap<RowKey, usize> = plan
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, p)| self.data.row_key(p.ordinal).map(|key| (key, i)))
            .collect();

        // Free leaving units before checking out for entering ones.
        let leaving: Vec<RowKey> = self
            .rows
            .keys()
            .filter(|key| !wanted.contains_key(key))
            .copied()
            .collect();
        for key in leaving {
            if let Some(presenter) = self.rows.remove(&key) {
                self.release_row(presenter);
            }
        }
        let leaving: Vec<usize> = self
            .blocks
            .keys()
            .filter(|b| !plan.blocks.contains(b))
            .copied()
            .collect();
        for ordinal in leaving {
            if let Some(presenter) = self.blocks.remove(&ordinal) {
                self.release_block(presenter);
            }
        }

        let definition = self.template.definition();
        let mut entered = 0;
        for placement in &plan.rows {
            let Some(key) = self.data.row_key(placement.ordinal) else {
                continue;
            };
            let presenter = match self.rows.entry(key) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    entered += 1;
                    let mut presenter = RowPresenter::new(key, self.template.rows().len());
                    for (index, binding) in self.template.rows().iter().enumerate() {
                        let value = binding.read(&*self.data, placement.ordinal);
                        let id = materialize(
                            &mut self.elements,
                            &self.edit_sender,
                            binding,
                            index,
                            Owner::Row(key),
                            value,
                        );
                        presenter.elements.push(id);
                    }
                    entry.insert(presenter)
                }
            };
            presenter.ordinal = placement.ordinal;
            presenter.block = placement.block;
            presenter.flow_index = placement.flow_index;
            presenter.position = placement.position;
            for (index, binding) in self.template.rows().iter().enumerate() {
                presenter.rects[index] = plan.row_rect(
                    definition,
                    binding.range(),
                    placement.block,
                    placement.flow_index,
                );
            }
        }

        let flow_count = self.layout.flow_count();
        for ordinal in plan.blocks.clone() {
            let rows = plan.block_rows(ordinal);
            let position = plan.orientation.position(ordinal * flow_count, plan.dimension);
            let presenter = self.blocks.entry(ordinal).or_insert_with(|| BlockPresenter {
                ordinal,
                position,
                rows: rows.clone(),
                elements: Vec::new(),
                rects: Vec::new(),
            });
            if presenter.elements.is_empty() && !self.template.blocks().is_empty() {
                for (index, binding) in self.template.blocks().iter().enumerate() {
                    let cx = BlockContext {
                        block: ordinal,
                        rows: rows.clone(),
                        data: &*self.data,
                    };
                    let id = materialize(
                        &mut self.elements,
                        &self.edit_sender,
                        binding,
                        index,
                        Owner::Block(ordinal),
                        binding.read(&cx),
                    );
                    presenter.elements.push(id);
                }
            } else if presenter.rows != rows || self.blocks_dirty {
                for (binding, id) in self.template.blocks().iter().zip(&presenter.elements) {
                    let cx = BlockContext {
                        block: ordinal,
                        rows: rows.clone(),
                        data: &*self.data,
                    };
                    if let Some(element) = self.elements.get_mut(*id) {
                        binding.refresh(element, binding.read(&cx));
                    }
                }
            }
            presenter.rows = rows;
            presenter.position = position;
            presenter.rects = self
                .template
                .blocks()
                .iter()
                .map(|b| plan.block_rect(definition, b.range(), ordinal))
                .collect();
        }
        self.blocks_dirty = false;

        for presenter in &mut self.scalar_presenters {
            let Some(binding) = self.template.scalars().get(presenter.binding) else {
                continue;
            };
            presenter.assign(presenter.slot);
            if presenter.element.is_none() {
                let owner = Owner::Scalar {
                    binding: presenter.binding,
                    slot: presenter.slot,
                };
                let value = binding.read(&self.scalars);
                presenter.element = Some(materialize(
                    &mut self.elements,
                    &self.edit_sender,
                    binding,
                    presenter.binding,
                    owner,
                    value,
                ));
            }
            presenter.rect =
                plan.scalar_rect(definition, binding.range(), presenter.slot, binding.mode());
            presenter.value_error = self.scalars.value_error(binding.scalar());
        }

        if self.auto_capacity {
            let window = self.rows.len() * self.template.rows().len()
                + self.blocks.len() * self.template.blocks().len()
                + self.scalar_presenters.len();
            self.elements.set_capacity(window.max(1));
        }

        tracing::debug!(
            target: targets::LAYOUT,
            rows = self.rows.len(),
            entered,
            blocks = self.blocks.len(),
            elements = self.elements.len(),
            in_use = self.elements.in_use(),
            "layout pass"
        );
        self.plan = Some(plan);
    }

    /// Elements go back in reverse so the next unit checks them out in
    /// binding order.
    fn release_row(&mut self, presenter: RowPresenter) {
        for (index, id) in presenter.elements.into_iter().enumerate().rev() {
            if let Some(binding) = self.template.rows().get(index) {
                release(&mut self.elements, binding, id);
            }
        }
    }

    fn release_block(&mut self, presenter: BlockPresenter) {
        for (index, id) in presenter.elements.into_iter().enumerate().rev() {
            if let Some(binding) = self.template.blocks().get(index) {
                release(&mut self.elements, binding, id);
            }
        }
    }

    /// Apply queued data changes. Structural changes re-run the last layout
    /// when `relayout` is set.
    fn process_changes(&mut self, relayout: bool) {
        let changes = self.changes.drain();
        if changes.is_empty() {
            return;
        }
        let mut structural = false;
        for change in changes {
            tracing::trace!(target: targets::PRESENTER, ?change, "data change");
            match change {
                DataChange::CellChanged { key, column } => self.cell_changed(key, column),
                DataChange::RowsInserted { keys, .. } => {
                    for key in keys {
                        self.request_validation(key, None);
                    }
                    structural = true;
                }
                DataChange::RowsRemoved { keys, .. } => {
                    for key in keys {
                        self.validation.remove_row(key);
                        if let Some(presenter) = self.rows.remove(&key) {
                            self.release_row(presenter);
                        }
                    }
                    structural = true;
                }
                DataChange::Reset => {
                    self.validation.clear();
                    let rows: Vec<RowPresenter> = self.rows.drain().map(|(_, p)| p).collect();
                    for presenter in rows {
                        self.release_row(presenter);
                    }
                    structural = true;
                }
            }
        }
        self.blocks_dirty = true;
        if relayout && self.plan.is_some() {
            if structural {
                self.relayout();
            } else {
                self.refresh_blocks();
            }
        }
    }

    fn cell_changed(&mut self, key: RowKey, column: ColumnId) {
        let Some(ordinal) = self.data.ordinal_of(key) else {
            return;
        };
        if let Some(presenter) = self.rows.get(&key) {
            for (binding, id) in self.template.rows().iter().zip(&presenter.elements) {
                if !binding.depends_on(column) {
                    continue;
                }
                if let Some(element) = self.elements.get_mut(*id) {
                    binding.refresh(element, binding.read(&*self.data, ordinal));
                }
            }
        }
        self.request_validation(key, Some(column));
    }

    fn refresh_blocks(&mut self) {
        if !self.blocks_dirty {
            return;
        }
        for presenter in self.blocks.values() {
            for (binding, id) in self.template.blocks().iter().zip(&presenter.elements) {
                let cx = BlockContext {
                    block: presenter.ordinal,
                    rows: presenter.rows.clone(),
                    data: &*self.data,
                };
                if let Some(element) = self.elements.get_mut(*id) {
                    binding.refresh(element, binding.read(&cx));
                }
            }
        }
        self.blocks_dirty = false;
    }

    /// Re-push scalar values and value errors, for one scalar or all.
    fn refresh_scalars(&mut self, only: Option<ScalarId>) {
        for presenter in &mut self.scalar_presenters {
            let Some(binding) = self.template.scalars().get(presenter.binding) else {
                continue;
            };
            if only.is_some_and(|id| id != binding.scalar()) {
                continue;
            }
            presenter.value_error = self.scalars.value_error(binding.scalar());
            if let Some(element) = presenter.element.and_then(|id| self.elements.get_mut(id)) {
                binding.refresh(element, binding.read(&self.scalars));
            }
        }
    }

    fn request_validation(&mut self, key: RowKey, changed: Option<ColumnId>) -> usize {
        if self.validation.validators().is_empty() {
            return 0;
        }
        let Some(ordinal) = self.data.ordinal_of(key) else {
            tracing::debug!(target: targets::VALIDATION, %key, "row gone before validation");
            return 0;
        };
        self.request_validation_at(ordinal, changed)
    }

    fn request_validation_at(&mut self, ordinal: usize, changed: Option<ColumnId>) -> usize {
        if self.validation.validators().is_empty() {
            return 0;
        }
        match self.data.snapshot(ordinal) {
            Ok(row) => self.validation.request(row, changed),
            Err(err) => {
                tracing::warn!(target: targets::VALIDATION, ordinal, %err, "row snapshot failed");
                0
            }
        }
    }

    fn apply_row_edit(&mut self, key: RowKey, edit: &PendingEdit) {
        let Some(binding) = self.template.rows().get(edit.binding) else {
            return;
        };
        let Some(ordinal) = self.data.ordinal_of(key) else {
            return;
        };
        let result = binding.write(&*self.data, ordinal, &edit.value);
        let Some(presenter) = self.rows.get_mut(&key) else {
            return;
        };
        match result {
            Ok(()) => presenter.input_errors[edit.binding] = None,
            Err(err) => {
                tracing::debug!(target: targets::BINDING, %key, id = %err.id, "row edit rejected");
                presenter.input_errors[edit.binding] = Some(err);
            }
        }
    }

    fn apply_scalar_edit(&mut self, index: usize, slot: usize, edit: &PendingEdit) {
        let Some(binding) = self.template.scalars().get(index) else {
            return;
        };
        let result = binding.write(&mut self.scalars, &edit.value);
        let scalar = binding.scalar();
        if let Some(presenter) = self
            .scalar_presenters
            .iter_mut()
            .find(|p| p.binding == index && p.slot == slot)
        {
            presenter.input_error = result.as_ref().err().cloned();
        }
        match result {
            Ok(true) => self.refresh_scalars(Some(scalar)),
            Ok(false) => {}
            Err(err) => {
                tracing::debug!(target: targets::BINDING, id = %err.id, "scalar edit rejected");
            }
        }
    }
}

impl<D: DataSource> std::fmt::Debug for GridPresenter<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridPresenter")
            .field("rows", &self.rows.len())
            .field("blocks", &self.blocks.len())
            .field("scalars", &self.scalar_presenters.len())
            .field("elements", &self.elements)
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

fn materialize<B: Binding>(
    elements: &mut ElementsManager,
    edits: &UiSender<PendingEdit>,
    binding: &B,
    index: usize,
    owner: Owner,
    value: Value,
) -> ElementId {
    let id = elements.checkout(binding.element());
    if let Some(element) = elements.get_mut(id) {
        let cx = AttachContext {
            id,
            owner,
            binding: index,
            edits,
        };
        binding.attach(cx, element, value);
        tracing::trace!(target: targets::ELEMENTS, ?id, ?owner, "attached");
    }
    id
}

fn release<B: Binding>(elements: &mut ElementsManager, binding: &B, id: ElementId) {
    if let Some(element) = elements.get_mut(id) {
        let owner = binding.detach(element);
        tracing::trace!(target: targets::ELEMENTS, ?id, ?owner, "detached");
    }
    elements.release(id);
}
