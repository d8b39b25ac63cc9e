//! Task identity types.
//!
//! Every enqueued task receives a [`TaskId`] drawn from a single counter shared
//! by both queues, so ids are unique and totally ordered by enqueue time.

use std::fmt;

/// Enqueue sequence number of a task.
///
/// Ids are handed out in strictly increasing order. Comparing two ids tells
/// which task was enqueued first, regardless of the queue it went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw sequence number.
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Returns the raw sequence number.
    pub const fn seq(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which queue a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Timer/IO/check-phase work, dequeued one per cycle.
    Macrotask,
    /// Promise-continuation work, drained to exhaustion after each macrotask.
    Microtask,
}

impl TaskKind {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskKind::Macrotask => "macrotask",
            TaskKind::Microtask => "microtask",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Handle returned by every enqueue operation.
///
/// A handle can be used to cancel a task that has not run yet. Holding a
/// handle does not keep anything alive; it is just the task's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    id: TaskId,
    kind: TaskKind,
}

impl TaskHandle {
    /// Creates a handle for the given task.
    pub const fn new(id: TaskId, kind: TaskKind) -> Self {
        Self { id, kind }
    }

    /// The task's enqueue sequence number.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// The queue the task was placed in.
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}
