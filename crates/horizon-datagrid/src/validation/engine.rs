//! Asynchronous, cancellable validation.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_datagrid_core::{CancellationToken, ThreadAffinity, ThreadPool, UiQueue};

use super::message::{MessageKind, ValidationMessage};
use super::sealed::{AsyncValidatorGroup, MessageGroup, ValidationDictionary};
use crate::data::{ColumnId, RowKey, RowSnapshot};
use crate::error::ValidationFault;
use crate::logging::targets;

/// A validator that runs off the UI thread.
///
/// `validate` receives an owned snapshot of the row and a cancellation
/// token. Long-running validators should poll the token and return
/// [`ValidationFault::Cancelled`] once it fires; a validator that ignores it
/// still has its late result discarded.
pub trait AsyncValidator: Send + Sync {
    /// Name, unique within a group.
    fn name(&self) -> &str;

    /// Columns whose changes trigger this validator. Empty means all.
    fn dependencies(&self) -> &[ColumnId] {
        &[]
    }

    /// Validate one row.
    fn validate(
        &self,
        row: &RowSnapshot,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationMessage>, ValidationFault>;
}

/// An [`AsyncValidator`] backed by a closure.
///
/// # Example
///
/// ```
/// use horizon_datagrid::data::ColumnId;
/// use horizon_datagrid::validation::{AsyncValidator, FnValidator, ValidationMessage};
///
/// let positive = FnValidator::new("qty.positive", |row, _cancel| {
///     let qty = row.get(ColumnId(1)).as_int().unwrap_or(0);
///     Ok(if qty < 0 {
///         vec![ValidationMessage::error("qty.negative", "quantity must not be negative")]
///     } else {
///         Vec::new()
///     })
/// })
/// .depends_on([ColumnId(1)]);
///
/// assert_eq!(positive.dependencies(), &[ColumnId(1)]);
/// ```
pub struct FnValidator<F> {
    name: String,
    dependencies: Vec<ColumnId>,
    validate: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&RowSnapshot, &CancellationToken) -> Result<Vec<ValidationMessage>, ValidationFault>
        + Send
        + Sync,
{
    /// Wrap `validate` under `name`.
    pub fn new(name: impl Into<String>, validate: F) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            validate,
        }
    }

    /// Restrict triggering to changes of `columns`.
    pub fn depends_on(mut self, columns: impl IntoIterator<Item = ColumnId>) -> Self {
        self.dependencies = columns.into_iter().collect();
        self
    }
}

impl<F> AsyncValidator for FnValidator<F>
where
    F: Fn(&RowSnapshot, &CancellationToken) -> Result<Vec<ValidationMessage>, ValidationFault>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[ColumnId] {
        &self.dependencies
    }

    fn validate(
        &self,
        row: &RowSnapshot,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationMessage>, ValidationFault> {
        (self.validate)(row, cancel)
    }
}

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Identifies one validator run. Tokens increase monotonically per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunToken(u64);

/// State of one validator for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidatorStatus {
    /// Never run.
    #[default]
    Idle,
    /// A run is in flight.
    Running,
    /// The last run finished and its messages were merged.
    Completed,
    /// The last run failed.
    Faulted,
    /// The last run was cancelled.
    Cancelled,
}

struct RunState {
    token: RunToken,
    status: ValidatorStatus,
    cancel: CancellationToken,
}

/// A finished run travelling back to the UI thread.
#[derive(Debug)]
pub(crate) struct RunResult {
    pub(crate) validator: usize,
    pub(crate) row: RowKey,
    pub(crate) token: RunToken,
    pub(crate) outcome: Result<Vec<ValidationMessage>, ValidationFault>,
}

/// Runs async validators and keeps their per-row results.
///
/// Each validator has its own [`ValidationDictionary`]; a completed run
/// replaces that validator's entry for the row and leaves other validators'
/// entries alone. Starting a run for a (validator, row) pair cancels the one
/// in flight, and results whose [`RunToken`] is not the last one issued for
/// their pair are dropped in [`pump`](Self::pump).
pub struct ValidationEngine {
    validators: AsyncValidatorGroup,
    dictionaries: Vec<ValidationDictionary>,
    runs: HashMap<(usize, RowKey), RunState>,
    next_token: u64,
    pool: ThreadPool,
    results: UiQueue<RunResult>,
    affinity: ThreadAffinity,
}

impl ValidationEngine {
    /// Create an engine running `validators` on `pool`. The group is sealed.
    pub fn new(validators: AsyncValidatorGroup, pool: ThreadPool) -> Self {
        let validators = validators.seal();
        let dictionaries = (0..validators.len())
            .map(|_| ValidationDictionary::new().seal())
            .collect();
        Self {
            validators,
            dictionaries,
            runs: HashMap::new(),
            next_token: 1,
            pool,
            results: UiQueue::unbounded(),
            affinity: ThreadAffinity::current(),
        }
    }

    /// The registered validators.
    pub fn validators(&self) -> &AsyncValidatorGroup {
        &self.validators
    }

    /// Start every validator affected by a change of `changed` in `row`;
    /// `None` starts them all. Returns the number of runs started.
    pub fn request(&mut self, row: RowSnapshot, changed: Option<ColumnId>) -> usize {
        let row = Arc::new(row);
        let affected: Vec<(usize, Arc<dyn AsyncValidator>)> = self
            .validators
            .iter()
            .enumerate()
            .filter(|(_, v)| match changed {
                None => true,
                Some(column) => v.dependencies().is_empty() || v.dependencies().contains(&column),
            })
            .map(|(i, v)| (i, v.clone()))
            .collect();
        let started = affected.len();
        for (index, validator) in affected {
            self.start(index, validator, row.clone());
        }
        started
    }

    fn start(
        &mut self,
        index: usize,
        validator: Arc<dyn AsyncValidator>,
        row: Arc<RowSnapshot>,
    ) -> RunToken {
        self.affinity.debug_assert_same_thread();
        let key = row.key();
        let token = RunToken(self.next_token);
        self.next_token += 1;

        if let Some(previous) = self.runs.get(&(index, key))
            && previous.status == ValidatorStatus::Running
        {
            previous.cancel.cancel();
            tracing::debug!(
                target: targets::VALIDATION,
                row = %key,
                validator = index,
                "cancelled in-flight run"
            );
        }

        let cancel = CancellationToken::new();
        self.runs.insert(
            (index, key),
            RunState {
                token,
                status: ValidatorStatus::Running,
                cancel: cancel.clone(),
            },
        );

        tracing::trace!(
            target: targets::VALIDATION,
            row = %key,
            validator = validator.name(),
            ?token,
            "starting run"
        );
        self.pool.spawn_to(self.results.sender(), move || {
            let outcome = if cancel.is_cancelled() {
                Err(ValidationFault::Cancelled)
            } else {
                run_guarded(validator.as_ref(), &row, &cancel)
            };
            RunResult {
                validator: index,
                row: key,
                token,
                outcome,
            }
        });
        token
    }

    /// Merge every result that has arrived. Returns the number merged.
    pub fn pump(&mut self) -> usize {
        let results = self.results.drain();
        results.into_iter().filter(|r| self.apply(r)).count()
    }

    /// Merge results until no run is in flight or `timeout` elapses.
    pub fn pump_until_idle(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut merged = self.pump();
        while self.is_busy() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            for result in self.results.drain_timeout(deadline - now) {
                if self.apply(&result) {
                    merged += 1;
                }
            }
        }
        merged
    }

    pub(crate) fn apply(&mut self, result: &RunResult) -> bool {
        let Some(state) = self.runs.get_mut(&(result.validator, result.row)) else {
            tracing::trace!(
                target: targets::VALIDATION,
                row = %result.row,
                "result for forgotten row dropped"
            );
            return false;
        };
        if state.token != result.token {
            tracing::debug!(
                target: targets::VALIDATION,
                row = %result.row,
                validator = result.validator,
                stale = ?result.token,
                current = ?state.token,
                "stale result dropped"
            );
            return false;
        }
        if state.cancel.is_cancelled() {
            state.status = ValidatorStatus::Cancelled;
            return false;
        }
        match &result.outcome {
            Ok(messages) => {
                state.status = ValidatorStatus::Completed;
                let dict = &self.dictionaries[result.validator];
                let updated = if messages.is_empty() {
                    dict.remove(result.row)
                } else {
                    dict.add(
                        result.row,
                        messages
                            .iter()
                            .cloned()
                            .map(|mut m| {
                                m.kind = MessageKind::Validation;
                                m
                            })
                            .collect(),
                    )
                };
                self.dictionaries[result.validator] = updated;
                true
            }
            Err(ValidationFault::Cancelled) => {
                state.status = ValidatorStatus::Cancelled;
                false
            }
            Err(ValidationFault::Failed(reason)) => {
                state.status = ValidatorStatus::Faulted;
                tracing::warn!(
                    target: targets::VALIDATION,
                    row = %result.row,
                    validator = ?self.validators.get(result.validator).map(|v| v.name()),
                    %reason,
                    "validator faulted"
                );
                false
            }
        }
    }

    /// Cancel every run for `row` and forget its results.
    pub fn remove_row(&mut self, row: RowKey) {
        self.runs.retain(|(_, key), state| {
            if *key == row {
                state.cancel.cancel();
                false
            } else {
                true
            }
        });
        for dict in &mut self.dictionaries {
            if dict.contains(row) {
                *dict = dict.remove(row);
            }
        }
    }

    /// Cancel everything and forget all results.
    pub fn clear(&mut self) {
        for state in self.runs.values() {
            state.cancel.cancel();
        }
        self.runs.clear();
        for dict in &mut self.dictionaries {
            *dict = ValidationDictionary::new().seal();
        }
    }

    /// Messages for `row`, concatenated in validator registration order.
    pub fn messages(&self, row: RowKey) -> MessageGroup {
        self.dictionaries
            .iter()
            .filter_map(|d| d.get(row))
            .fold(MessageGroup::new().seal(), |acc, g| acc.concat(g))
    }

    /// The current results of the validator at `index`.
    pub fn dictionary(&self, index: usize) -> Option<&ValidationDictionary> {
        self.dictionaries.get(index)
    }

    /// Status of validator `index` for `row`.
    pub fn status(&self, index: usize, row: RowKey) -> ValidatorStatus {
        self.runs
            .get(&(index, row))
            .map_or(ValidatorStatus::Idle, |s| s.status)
    }

    /// Last token issued for validator `index` and `row`.
    pub fn token(&self, index: usize, row: RowKey) -> Option<RunToken> {
        self.runs.get(&(index, row)).map(|s| s.token)
    }

    /// Whether any run is in flight.
    pub fn is_busy(&self) -> bool {
        self.runs
            .values()
            .any(|s| s.status == ValidatorStatus::Running)
    }
}

/// Run `validator`, turning a panic into [`ValidationFault::Failed`] so a
/// buggy validator faults its own run instead of the worker.
fn run_guarded(
    validator: &dyn AsyncValidator,
    row: &RowSnapshot,
    cancel: &CancellationToken,
) -> Result<Vec<ValidationMessage>, ValidationFault> {
    panic::catch_unwind(AssertUnwindSafe(|| validator.validate(row, cancel))).unwrap_or_else(
        |payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ValidationFault::Failed(format!(
                "validator '{}' panicked: {reason}",
                validator.name()
            )))
        },
    )
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("validators", &self.validators)
            .field("runs", &self.runs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, Value, ValueKind};
    use horizon_datagrid_core::ThreadPoolConfig;

    fn snapshot(key: u64, qty: i64) -> RowSnapshot {
        RowSnapshot::new(
            RowKey(key),
            0,
            vec![Column::new(ColumnId(0), "qty", ValueKind::Int)].into(),
            vec![Value::Int(qty)],
        )
    }

    fn engine(group: AsyncValidatorGroup) -> ValidationEngine {
        ValidationEngine::new(group, ThreadPool::new(ThreadPoolConfig::with_threads(2)).unwrap())
    }

    fn negative() -> Arc<dyn AsyncValidator> {
        Arc::new(FnValidator::new("negative", |row, _| {
            Ok(match row.get(ColumnId(0)).as_int() {
                Some(n) if n < 0 => vec![ValidationMessage::error("qty.negative", "negative")],
                _ => Vec::new(),
            })
        }))
    }

    #[test]
    fn test_completed_run_is_merged_then_cleared() {
        let mut e = engine(AsyncValidatorGroup::new().add(negative()));
        assert_eq!(e.request(snapshot(1, -5), None), 1);
        e.pump_until_idle(Duration::from_secs(5));
        assert_eq!(e.status(0, RowKey(1)), ValidatorStatus::Completed);
        assert_eq!(e.messages(RowKey(1)).len(), 1);

        e.request(snapshot(1, 5), None);
        e.pump_until_idle(Duration::from_secs(5));
        assert!(e.messages(RowKey(1)).is_empty());
        assert!(e.dictionary(0).unwrap().is_empty());
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut e = engine(AsyncValidatorGroup::new().add(negative()));
        // Register a run, then inject a result carrying an older token.
        e.runs.insert(
            (0, RowKey(1)),
            RunState {
                token: RunToken(10),
                status: ValidatorStatus::Running,
                cancel: CancellationToken::new(),
            },
        );
        let stale = RunResult {
            validator: 0,
            row: RowKey(1),
            token: RunToken(9),
            outcome: Ok(vec![ValidationMessage::error("x", "late")]),
        };
        assert!(!e.apply(&stale));
        assert!(e.messages(RowKey(1)).is_empty());
        assert_eq!(e.status(0, RowKey(1)), ValidatorStatus::Running);
    }

    #[test]
    fn test_dependencies_filter_requests() {
        let only_other: Arc<dyn AsyncValidator> = Arc::new(
            FnValidator::new("other", |_, _| Ok(Vec::new())).depends_on([ColumnId(3)]),
        );
        let mut e = engine(AsyncValidatorGroup::new().add(negative()).add(only_other));
        assert_eq!(e.request(snapshot(1, 0), Some(ColumnId(0))), 1);
        assert_eq!(e.request(snapshot(1, 0), Some(ColumnId(3))), 2);
        e.pump_until_idle(Duration::from_secs(5));
        assert_eq!(e.status(1, RowKey(1)), ValidatorStatus::Completed);
    }

    #[test]
    fn test_fault_is_recorded_not_merged() {
        let failing: Arc<dyn AsyncValidator> = Arc::new(FnValidator::new("boom", |_, _| {
            Err(ValidationFault::Failed("database offline".into()))
        }));
        let mut e = engine(AsyncValidatorGroup::new().add(failing));
        e.request(snapshot(1, 0), None);
        e.pump_until_idle(Duration::from_secs(5));
        assert_eq!(e.status(0, RowKey(1)), ValidatorStatus::Faulted);
        assert!(e.messages(RowKey(1)).is_empty());
    }

    #[test]
    fn test_panicking_validator_faults_its_run() {
        let panicking: Arc<dyn AsyncValidator> =
            Arc::new(FnValidator::new("buggy", |_, _| panic!("validator bug")));
        let mut e = engine(AsyncValidatorGroup::new().add(panicking).add(negative()));
        assert_eq!(e.request(snapshot(1, -1), None), 2);
        e.pump_until_idle(Duration::from_secs(5));
        assert_eq!(e.status(0, RowKey(1)), ValidatorStatus::Faulted);
        assert_eq!(e.status(1, RowKey(1)), ValidatorStatus::Completed);
        assert_eq!(e.messages(RowKey(1)).len(), 1);

        // The pool survives and keeps serving runs.
        e.request(snapshot(2, -1), None);
        e.pump_until_idle(Duration::from_secs(5));
        assert_eq!(e.status(1, RowKey(2)), ValidatorStatus::Completed);
    }

    #[test]
    fn test_remove_row_forgets_results() {
        let mut e = engine(AsyncValidatorGroup::new().add(negative()));
        e.request(snapshot(1, -1), None);
        e.pump_until_idle(Duration::from_secs(5));
        e.remove_row(RowKey(1));
        assert!(e.messages(RowKey(1)).is_empty());
        assert_eq!(e.status(0, RowKey(1)), ValidatorStatus::Idle);
    }

    #[test]
    fn test_messages_follow_registration_order() {
        let first: Arc<dyn AsyncValidator> = Arc::new(FnValidator::new("first", |_, _| {
            Ok(vec![ValidationMessage::warning("first", "1")])
        }));
        let second: Arc<dyn AsyncValidator> = Arc::new(FnValidator::new("second", |_, _| {
            Ok(vec![ValidationMessage::error("second", "2")])
        }));
        let mut e = engine(AsyncValidatorGroup::new().add(second.clone()).add(first.clone()));
        e.request(snapshot(1, 0), None);
        e.pump_until_idle(Duration::from_secs(5));
        let ids: Vec<_> = e.messages(RowKey(1)).iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }
}
