//! Event loop implementation.
//!
//! This module provides the cooperative scheduler that coordinates macrotask
//! and microtask execution following the JavaScript event loop model.

use crate::context::TaskContext;
use crate::task_queue::{QueuedTask, Queues, Task};
use core_types::{
    CallbackError, FailurePolicy, SchedulerConfig, SchedulerError, TaskFailure, TaskHandle,
    TaskKind,
};
use std::fmt;

/// Where the scheduler is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No cycle in progress.
    Idle,
    /// Running the one macrotask of the current cycle.
    DequeuingMacrotask,
    /// Draining the microtask queue to exhaustion.
    DrainingMicrotasks,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchedulerState::Idle => "idle",
            SchedulerState::DequeuingMacrotask => "dequeuing_macrotask",
            SchedulerState::DrainingMicrotasks => "draining_microtasks",
        })
    }
}

/// Counters accumulated over the scheduler's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Completed cycles (macrotask, if any, plus a full drain).
    pub cycles: u64,
    /// Macrotask callbacks invoked.
    pub macrotasks_run: u64,
    /// Microtask callbacks invoked.
    pub microtasks_run: u64,
    /// Callbacks that returned an error.
    pub failures: u64,
}

/// How a bounded run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Both queues were observed empty.
    Completed {
        /// Callbacks invoked during the run.
        callbacks: usize,
    },
    /// The callback budget was spent while work was still queued.
    BudgetExhausted {
        /// Callbacks invoked during the run (equal to the budget).
        callbacks: usize,
    },
}

impl RunOutcome {
    /// Returns true if the run reached an empty scheduler.
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

type ErrorHandler = Box<dyn FnMut(&TaskFailure) + Send>;

/// Callbacks the current call may still invoke.
struct Budget {
    remaining: Option<usize>,
    used: usize,
}

impl Budget {
    fn unlimited() -> Self {
        Self {
            remaining: None,
            used: 0,
        }
    }

    fn limited(max: usize) -> Self {
        Self {
            remaining: Some(max),
            used: 0,
        }
    }

    fn take(&mut self) -> bool {
        match &mut self.remaining {
            Some(0) => return false,
            Some(n) => *n -= 1,
            None => {}
        }
        self.used += 1;
        true
    }
}

enum CycleStep {
    Completed { ran_macrotask: bool },
    BudgetSpent,
}

/// The cooperative task scheduler.
///
/// Each iteration (cycle) of the loop:
/// 1. Takes the oldest macrotask, if any, and executes it
/// 2. Drains all microtasks, including those enqueued during the drain
/// 3. Repeats while either queue has work
///
/// The host program that registers the initial work counts as the turn
/// before the first cycle: microtasks it enqueued are drained before the
/// first macrotask runs. No macrotask is ever dequeued while a microtask is
/// pending.
///
/// A callback that fails does not stop the loop; see [`FailurePolicy`].
///
/// # Examples
///
/// ```
/// use async_runtime::Scheduler;
/// use std::sync::{Arc, Mutex};
///
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let mut scheduler = Scheduler::new();
///
/// let l = log.clone();
/// scheduler.enqueue_macrotask(move |_| {
///     l.lock().unwrap().push("timeout");
///     Ok(())
/// });
/// let l = log.clone();
/// scheduler.enqueue_microtask(move |_| {
///     l.lock().unwrap().push("promise");
///     Ok(())
/// });
///
/// scheduler.run_to_completion().unwrap();
/// assert_eq!(*log.lock().unwrap(), vec!["promise", "timeout"]);
/// ```
pub struct Scheduler {
    queues: Queues,
    state: SchedulerState,
    config: SchedulerConfig,
    stats: SchedulerStats,
    failures: Vec<TaskFailure>,
    error_handler: Option<ErrorHandler>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates a scheduler with empty queues and the default configuration.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates a scheduler with empty queues and the given configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            queues: Queues::new(),
            state: SchedulerState::Idle,
            config,
            stats: SchedulerStats::default(),
            failures: Vec::new(),
            error_handler: None,
        }
    }

    /// Adds a macrotask at the tail of the macrotask queue.
    pub fn enqueue_macrotask<F>(&mut self, f: F) -> TaskHandle
    where
        F: FnOnce(&mut TaskContext<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        self.enqueue(TaskKind::Macrotask, Task::new(f))
    }

    /// Adds a microtask at the tail of the microtask queue.
    pub fn enqueue_microtask<F>(&mut self, f: F) -> TaskHandle
    where
        F: FnOnce(&mut TaskContext<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        self.enqueue(TaskKind::Microtask, Task::new(f))
    }

    /// Adds a prepared task at the tail of the queue for `kind`.
    pub fn enqueue(&mut self, kind: TaskKind, task: Task) -> TaskHandle {
        self.queues.push(kind, task)
    }

    /// Removes a task that has not run yet.
    ///
    /// Returns `false` if the task already ran or was already cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.queues.cancel(handle)
    }

    /// Registers a handler called with every callback failure.
    ///
    /// Replaces any previously registered handler.
    pub fn set_error_handler<H>(&mut self, handler: H)
    where
        H: FnMut(&TaskFailure) + Send + 'static,
    {
        self.error_handler = Some(Box::new(handler));
    }

    /// Returns the failures recorded since the last call.
    pub fn take_failures(&mut self) -> Vec<TaskFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Runs until both queues are empty.
    ///
    /// With [`FailurePolicy::Propagate`] this returns after the first cycle
    /// in which a callback failed; calling it again resumes the run.
    pub fn run_to_completion(&mut self) -> Result<(), SchedulerError> {
        while !self.queues.is_empty() {
            self.run_one_cycle()?;
        }
        tracing::debug!(stats = ?self.stats, "run completed");
        Ok(())
    }

    /// Runs until both queues are empty or `max_callbacks` callbacks have
    /// been invoked, whichever comes first.
    ///
    /// Useful for programs that may never settle, such as a microtask that
    /// keeps re-enqueuing itself.
    pub fn run_bounded(&mut self, max_callbacks: usize) -> Result<RunOutcome, SchedulerError> {
        let mut budget = Budget::limited(max_callbacks);
        while !self.queues.is_empty() {
            let mut first_failure = None;
            let step = self.cycle(&mut budget, &mut first_failure)?;
            finish(first_failure)?;
            if let CycleStep::BudgetSpent = step {
                tracing::debug!(
                    callbacks = budget.used,
                    pending_microtasks = self.queues.microtasks.len(),
                    pending_macrotasks = self.queues.macrotasks.len(),
                    "callback budget exhausted"
                );
                return Ok(RunOutcome::BudgetExhausted {
                    callbacks: budget.used,
                });
            }
        }
        Ok(RunOutcome::Completed {
            callbacks: budget.used,
        })
    }

    /// Processes one complete cycle: at most one macrotask followed by a
    /// full microtask drain.
    ///
    /// The drain happens even when no macrotask was queued. Microtasks that
    /// were already pending when the cycle began are drained before the
    /// macrotask. Returns whether a macrotask ran.
    pub fn run_one_cycle(&mut self) -> Result<bool, SchedulerError> {
        let mut first_failure = None;
        let step = self.cycle(&mut Budget::unlimited(), &mut first_failure)?;
        finish(first_failure)?;
        Ok(matches!(
            step,
            CycleStep::Completed {
                ran_macrotask: true
            }
        ))
    }

    /// Runs microtasks until the queue is observed empty.
    ///
    /// Microtasks enqueued during the drain are processed before this method
    /// returns. A microtask that always re-enqueues itself makes this loop
    /// forever.
    pub fn drain_microtasks(&mut self) -> Result<(), SchedulerError> {
        let mut first_failure = None;
        self.state = SchedulerState::DrainingMicrotasks;
        self.drain(&mut Budget::unlimited(), &mut first_failure)?;
        self.state = SchedulerState::Idle;
        finish(first_failure)
    }

    /// Current position in the cycle state machine.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns true if both queues are empty and no cycle is in progress.
    pub fn is_idle(&self) -> bool {
        self.state == SchedulerState::Idle && self.queues.is_empty()
    }

    /// Number of macrotasks waiting.
    pub fn pending_macrotasks(&self) -> usize {
        self.queues.macrotasks.len()
    }

    /// Number of microtasks waiting.
    pub fn pending_microtasks(&self) -> usize {
        self.queues.microtasks.len()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// The configuration this scheduler was built with.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn cycle(
        &mut self,
        budget: &mut Budget,
        first_failure: &mut Option<TaskFailure>,
    ) -> Result<CycleStep, SchedulerError> {
        // Microtasks left by the host script turn, or by a bounded run that
        // stopped mid-drain, belong to the previous turn.
        if !self.queues.microtasks.is_empty() {
            self.state = SchedulerState::DrainingMicrotasks;
            let drained = self.drain(budget, first_failure)?;
            self.state = SchedulerState::Idle;
            if !drained {
                return Ok(CycleStep::BudgetSpent);
            }
        }

        let mut ran_macrotask = false;
        if !self.queues.macrotasks.is_empty() {
            if !budget.take() {
                return Ok(CycleStep::BudgetSpent);
            }
            self.state = SchedulerState::DequeuingMacrotask;
            let entry = match self.queues.macrotasks.dequeue() {
                Some(entry) => entry,
                None => return Err(self.integrity_violation(TaskKind::Macrotask)),
            };
            self.invoke(TaskKind::Macrotask, entry, first_failure);
            self.stats.macrotasks_run += 1;
            ran_macrotask = true;
        }

        self.state = SchedulerState::DrainingMicrotasks;
        let drained = self.drain(budget, first_failure)?;
        self.state = SchedulerState::Idle;
        if !drained {
            return Ok(CycleStep::BudgetSpent);
        }

        self.stats.cycles += 1;
        tracing::trace!(cycle = self.stats.cycles, ran_macrotask, "cycle completed");
        Ok(CycleStep::Completed { ran_macrotask })
    }

    /// Returns false if the budget ran out before the queue emptied.
    fn drain(
        &mut self,
        budget: &mut Budget,
        first_failure: &mut Option<TaskFailure>,
    ) -> Result<bool, SchedulerError> {
        while !self.queues.microtasks.is_empty() {
            if !budget.take() {
                return Ok(false);
            }
            let entry = match self.queues.microtasks.dequeue() {
                Some(entry) => entry,
                None => return Err(self.integrity_violation(TaskKind::Microtask)),
            };
            self.invoke(TaskKind::Microtask, entry, first_failure);
            self.stats.microtasks_run += 1;
        }
        Ok(true)
    }

    fn invoke(
        &mut self,
        kind: TaskKind,
        entry: QueuedTask,
        first_failure: &mut Option<TaskFailure>,
    ) {
        let handle = TaskHandle::new(entry.id(), kind);
        let (label, callback) = entry.into_task().into_parts();
        tracing::trace!(task = %handle, label = label.as_deref().unwrap_or(""), "running task");

        let result = {
            let mut cx = TaskContext::new(&mut self.queues, handle, self.state);
            callback(&mut cx)
        };

        if let Err(error) = result {
            self.report(
                TaskFailure {
                    task: handle,
                    label,
                    error,
                },
                first_failure,
            );
        }
    }

    fn report(&mut self, failure: TaskFailure, first_failure: &mut Option<TaskFailure>) {
        self.stats.failures += 1;
        tracing::warn!(
            task = %failure.task,
            label = failure.label.as_deref().unwrap_or(""),
            error = %failure.error,
            "task callback failed"
        );

        if let Some(handler) = self.error_handler.as_mut() {
            handler(&failure);
        }
        if self.config.record_failures {
            self.failures.push(failure.clone());
        }
        if self.config.failure_policy == FailurePolicy::Propagate && first_failure.is_none() {
            *first_failure = Some(failure);
        }
    }

    fn integrity_violation(&self, kind: TaskKind) -> SchedulerError {
        let err = SchedulerError::QueueIntegrity {
            kind,
            reason: "queue reported pending entries but yielded none",
        };
        tracing::error!(error = %err, state = %self.state, "halting scheduler");
        err
    }
}

fn finish(first_failure: Option<TaskFailure>) -> Result<(), SchedulerError> {
    match first_failure {
        Some(failure) => Err(failure.into_scheduler_error()),
        None => Ok(()),
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state)
            .field("pending_macrotasks", &self.queues.macrotasks.len())
            .field("pending_microtasks", &self.queues.microtasks.len())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
