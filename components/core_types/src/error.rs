//! Error types for task callbacks and the scheduler.
//!
//! Two layers:
//!
//! - [`CallbackError`] is what a task callback returns when it fails. It is
//!   caught at the per-task boundary and never corrupts the queues.
//! - [`SchedulerError`] is what the drive loop hands back to the embedder:
//!   either a propagated callback failure or a fatal queue-integrity violation.

use std::sync::Arc;
use thiserror::Error;

use crate::task::{TaskHandle, TaskId, TaskKind};

/// Error raised by a task callback.
///
/// # Examples
///
/// ```
/// use core_types::CallbackError;
///
/// let err = CallbackError::new("connection refused");
/// assert_eq!(err.to_string(), "connection refused");
/// ```
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

impl CallbackError {
    /// Creates an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error, keeping it as the source.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Arc::new(err)),
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A callback failure together with the task it came from.
///
/// This is what error handlers receive and what the failure log stores.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    /// The failed task.
    pub task: TaskHandle,
    /// The label the task was enqueued with, if any.
    pub label: Option<String>,
    /// The error the callback returned.
    pub error: CallbackError,
}

impl TaskFailure {
    /// Converts the failure into the error returned by the drive loop.
    pub fn into_scheduler_error(self) -> SchedulerError {
        SchedulerError::Callback {
            task: self.task.id(),
            kind: self.task.kind(),
            label: self.label,
            source: self.error,
        }
    }
}

/// Errors returned by the scheduler's drive operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum SchedulerError {
    /// A callback failed and the failure policy asks for propagation.
    ///
    /// The cycle in which the failure happened was completed before this
    /// error was returned, so the queues are consistent and the run may be
    /// resumed.
    #[error("{kind} {task} failed: {source}")]
    Callback {
        /// Id of the failed task.
        task: TaskId,
        /// Queue the task came from.
        kind: TaskKind,
        /// Task label, if any.
        label: Option<String>,
        /// The callback's error.
        source: CallbackError,
    },

    /// The scheduler's own bookkeeping is inconsistent. Unrecoverable.
    #[error("queue integrity violated in {kind} queue: {reason}")]
    QueueIntegrity {
        /// Queue in which the violation was detected.
        kind: TaskKind,
        /// What went wrong.
        reason: &'static str,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use core_types::{SchedulerError, TaskKind};
    ///
    /// let err = SchedulerError::QueueIntegrity {
    ///     kind: TaskKind::Microtask,
    ///     reason: "empty dequeue",
    /// };
    /// assert_eq!(err.as_label(), "queue_integrity");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::Callback { .. } => "callback_failed",
            SchedulerError::QueueIntegrity { .. } => "queue_integrity",
        }
    }

    /// Whether the run can be resumed after this error.
    ///
    /// Callback failures leave the queues intact; integrity violations do not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SchedulerError::Callback { .. })
    }
}
