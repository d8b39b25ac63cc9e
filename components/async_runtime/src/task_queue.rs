//! Task and microtask queue management.
//!
//! This module provides the FIFO queues owned by the scheduler. Both queues
//! share one sequence counter, so a task's [`TaskId`] reflects its global
//! enqueue order.

use crate::context::TaskContext;
use core_types::{CallbackError, TaskHandle, TaskId, TaskKind};
use std::collections::VecDeque;

type Callback = Box<dyn FnOnce(&mut TaskContext<'_>) -> Result<(), CallbackError> + Send>;

/// A unit of work waiting in one of the scheduler's queues.
///
/// The callback receives a [`TaskContext`] through which it may enqueue more
/// work. Examples include setTimeout callbacks (as macrotasks) and promise
/// reactions (as microtasks).
pub struct Task {
    callback: Callback,
    label: Option<String>,
}

impl Task {
    /// Creates a new Task from a closure.
    ///
    /// # Arguments
    ///
    /// * `f` - The function to execute when the task runs
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut TaskContext<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        Self {
            callback: Box::new(f),
            label: None,
        }
    }

    /// Attaches a label shown in logs and failure reports.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, if one was attached.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Splits the task into its label and callback for invocation.
    pub(crate) fn into_parts(self) -> (Option<String>, Callback) {
        (self.label, self.callback)
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A task together with the id it was assigned on enqueue.
#[derive(Debug)]
pub struct QueuedTask {
    id: TaskId,
    task: Task,
}

impl QueuedTask {
    /// The enqueue sequence number.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The task's label, if any.
    pub fn label(&self) -> Option<&str> {
        self.task.label()
    }

    pub(crate) fn into_task(self) -> Task {
        self.task
    }
}

/// A FIFO queue of tasks of a single kind.
///
/// Entries are kept in ascending id order: they are appended with increasing
/// ids and removal never reorders the rest.
#[derive(Debug)]
pub struct TaskQueue {
    kind: TaskKind,
    queue: VecDeque<QueuedTask>,
}

impl TaskQueue {
    /// Creates a new empty queue for the given kind of task.
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            queue: VecDeque::new(),
        }
    }

    /// The kind of task this queue holds.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Adds a task to the end of the queue.
    ///
    /// `id` must be greater than every id already in the queue.
    pub fn enqueue(&mut self, id: TaskId, task: Task) {
        debug_assert!(self.queue.back().map_or(true, |last| last.id < id));
        self.queue.push_back(QueuedTask { id, task });
    }

    /// Removes and returns the next task from the queue.
    pub fn dequeue(&mut self) -> Option<QueuedTask> {
        self.queue.pop_front()
    }

    /// Removes the task with the given id, if it is still queued.
    pub fn remove(&mut self, id: TaskId) -> Option<QueuedTask> {
        let index = self.queue.binary_search_by_key(&id, |entry| entry.id).ok()?;
        self.queue.remove(index)
    }

    /// Returns true if a task with this id is waiting in the queue.
    pub fn contains(&self, id: TaskId) -> bool {
        self.queue.binary_search_by_key(&id, |entry| entry.id).is_ok()
    }

    /// The id of the task that would be dequeued next.
    pub fn front_id(&self) -> Option<TaskId> {
        self.queue.front().map(|entry| entry.id)
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// The pair of queues plus the shared sequence counter.
///
/// Only the scheduler and the [`TaskContext`] it hands out touch this.
#[derive(Debug)]
pub(crate) struct Queues {
    pub(crate) macrotasks: TaskQueue,
    pub(crate) microtasks: TaskQueue,
    next_seq: u64,
}

impl Queues {
    pub(crate) fn new() -> Self {
        Self {
            macrotasks: TaskQueue::new(TaskKind::Macrotask),
            microtasks: TaskQueue::new(TaskKind::Microtask),
            next_seq: 1,
        }
    }

    pub(crate) fn queue(&self, kind: TaskKind) -> &TaskQueue {
        match kind {
            TaskKind::Macrotask => &self.macrotasks,
            TaskKind::Microtask => &self.microtasks,
        }
    }

    fn queue_mut(&mut self, kind: TaskKind) -> &mut TaskQueue {
        match kind {
            TaskKind::Macrotask => &mut self.macrotasks,
            TaskKind::Microtask => &mut self.microtasks,
        }
    }

    /// Appends `task` to the tail of the queue for `kind`.
    pub(crate) fn push(&mut self, kind: TaskKind, task: Task) -> TaskHandle {
        let id = TaskId::new(self.next_seq);
        self.next_seq += 1;
        self.queue_mut(kind).enqueue(id, task);
        TaskHandle::new(id, kind)
    }

    /// Removes a not-yet-run task. Returns false if it already ran or was
    /// already cancelled.
    pub(crate) fn cancel(&mut self, handle: TaskHandle) -> bool {
        let removed = self.queue_mut(handle.kind()).remove(handle.id()).is_some();
        if removed {
            tracing::debug!(task = %handle, "cancelled pending task");
        }
        removed
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.macrotasks.is_empty() && self.microtasks.is_empty()
    }
}
