//! Async-function style continuation chains.
//!
//! An `async` body is a sequence of synchronous segments separated by
//! `await` points. Each segment here is a step, and every suspension point
//! becomes a microtask enqueue of the remaining steps. No coroutine is
//! involved, yet the resulting order matches awaiting already-resolved
//! promises.

use crate::context::TaskContext;
use crate::event_loop::Scheduler;
use crate::task_queue::Task;
use core_types::{CallbackError, TaskHandle, TaskKind};
use std::collections::VecDeque;

type Step = Box<dyn FnOnce(&mut TaskContext<'_>) -> Result<(), CallbackError> + Send>;

/// A chain of steps, each run in its own microtask.
///
/// The first step runs in the microtask enqueued by [`Continuation::start`];
/// each following step is enqueued at the microtask tail when the previous
/// one completes. A step that fails ends the chain.
///
/// # Examples
///
/// ```
/// use async_runtime::{Continuation, Scheduler};
/// use std::sync::{Arc, Mutex};
///
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let mut scheduler = Scheduler::new();
///
/// let (a, b) = (log.clone(), log.clone());
/// Continuation::new()
///     .then(move |_| { a.lock().unwrap().push("first await"); Ok(()) })
///     .then(move |_| { b.lock().unwrap().push("second await"); Ok(()) })
///     .start(&mut scheduler);
///
/// scheduler.run_to_completion().unwrap();
/// assert_eq!(*log.lock().unwrap(), vec!["first await", "second await"]);
/// ```
#[derive(Default)]
pub struct Continuation {
    steps: VecDeque<Step>,
    label: Option<String>,
}

impl Continuation {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step that runs after one more suspension point.
    pub fn then<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut TaskContext<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        self.steps.push_back(Box::new(f));
        self
    }

    /// Label given to every microtask of the chain.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Number of steps not yet run.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Enqueues the first step from the host program.
    ///
    /// Returns `None` for an empty chain, which enqueues nothing.
    pub fn start(self, scheduler: &mut Scheduler) -> Option<TaskHandle> {
        if self.is_empty() {
            return None;
        }
        Some(scheduler.enqueue(TaskKind::Microtask, self.into_task()))
    }

    /// Enqueues the first step from inside a running callback.
    pub fn start_in(self, cx: &mut TaskContext<'_>) -> Option<TaskHandle> {
        if self.is_empty() {
            return None;
        }
        Some(cx.enqueue(TaskKind::Microtask, self.into_task()))
    }

    fn into_task(self) -> Task {
        let label = self.label.clone();
        let task = Task::new(move |cx| self.resume(cx));
        match label {
            Some(label) => task.with_label(label),
            None => task,
        }
    }

    fn resume(mut self, cx: &mut TaskContext<'_>) -> Result<(), CallbackError> {
        let Some(step) = self.steps.pop_front() else {
            return Ok(());
        };
        step(cx)?;
        if !self.steps.is_empty() {
            cx.enqueue(TaskKind::Microtask, self.into_task());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Continuation")
            .field("steps", &self.steps.len())
            .field("label", &self.label)
            .finish()
    }
}
