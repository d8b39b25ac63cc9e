//! The view of the scheduler a running callback gets.

use crate::event_loop::SchedulerState;
use crate::task_queue::{Queues, Task};
use core_types::{CallbackError, TaskHandle, TaskKind};

/// Handed to every task callback while it runs.
///
/// A callback can only add work to the tail of either queue or cancel work
/// that has not run yet. It cannot dequeue, reorder or drive the loop.
///
/// # Examples
///
/// ```
/// use async_runtime::Scheduler;
///
/// let mut scheduler = Scheduler::new();
/// scheduler.enqueue_macrotask(|cx| {
///     cx.enqueue_microtask(|_| Ok(()));
///     assert_eq!(cx.pending_microtasks(), 1);
///     Ok(())
/// });
/// scheduler.run_to_completion().unwrap();
/// ```
pub struct TaskContext<'a> {
    queues: &'a mut Queues,
    current: TaskHandle,
    state: SchedulerState,
}

impl<'a> TaskContext<'a> {
    pub(crate) fn new(queues: &'a mut Queues, current: TaskHandle, state: SchedulerState) -> Self {
        Self {
            queues,
            current,
            state,
        }
    }

    /// Appends a macrotask. It runs in a later cycle, never the current one.
    pub fn enqueue_macrotask<F>(&mut self, f: F) -> TaskHandle
    where
        F: FnOnce(&mut TaskContext<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        self.queues.push(TaskKind::Macrotask, Task::new(f))
    }

    /// Appends a microtask. It runs within the drain currently in progress
    /// (or the one following the current macrotask).
    pub fn enqueue_microtask<F>(&mut self, f: F) -> TaskHandle
    where
        F: FnOnce(&mut TaskContext<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        self.queues.push(TaskKind::Microtask, Task::new(f))
    }

    /// Appends a prepared (possibly labelled) task to the queue for `kind`.
    pub fn enqueue(&mut self, kind: TaskKind, task: Task) -> TaskHandle {
        self.queues.push(kind, task)
    }

    /// Cancels a task that has not run yet. No-op if it already ran.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.queues.cancel(handle)
    }

    /// Handle of the task currently running.
    pub fn current(&self) -> TaskHandle {
        self.current
    }

    /// Scheduler state at the time the callback was invoked.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Macrotasks waiting, not counting the current one.
    pub fn pending_macrotasks(&self) -> usize {
        self.queues.queue(TaskKind::Macrotask).len()
    }

    /// Microtasks waiting, not counting the current one.
    pub fn pending_microtasks(&self) -> usize {
        self.queues.queue(TaskKind::Microtask).len()
    }
}

impl std::fmt::Debug for TaskContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("current", &self.current)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
