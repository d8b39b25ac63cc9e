//! Cooperative task scheduler.
//!
//! This crate reproduces the ordering law of a JavaScript-style event loop:
//! one macrotask runs, then the microtask queue is drained to exhaustion
//! before the next macrotask is considered.
//!
//! # Overview
//!
//! - [`Scheduler`] - Owns both queues and drives cycles
//! - [`TaskContext`] - What a running callback may do (enqueue, cancel)
//! - [`Task`], [`TaskQueue`] - Queued work and the FIFO holding it
//! - [`Continuation`] - Async-function style chains of microtasks
//!
//! # Examples
//!
//! ## Macrotasks and microtasks
//!
//! ```
//! use async_runtime::Scheduler;
//! use std::sync::{Arc, Mutex};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let mut scheduler = Scheduler::new();
//!
//! let l = log.clone();
//! scheduler.enqueue_macrotask(move |_| {
//!     l.lock().unwrap().push("timeout");
//!     Ok(())
//! });
//! let l = log.clone();
//! scheduler.enqueue_microtask(move |cx| {
//!     l.lock().unwrap().push("promise");
//!     let l = l.clone();
//!     cx.enqueue_microtask(move |_| {
//!         l.lock().unwrap().push("chained");
//!         Ok(())
//!     });
//!     Ok(())
//! });
//!
//! // Microtasks registered by the host drain before the first macrotask.
//! scheduler.run_to_completion().unwrap();
//! assert_eq!(*log.lock().unwrap(), vec!["promise", "chained", "timeout"]);
//! ```
//!
//! ## Failure handling
//!
//! ```
//! use async_runtime::Scheduler;
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.enqueue_macrotask(|_| Err("boom".into()));
//! scheduler.enqueue_macrotask(|_| Ok(()));
//!
//! // The failure is isolated; the second macrotask still runs.
//! scheduler.run_to_completion().unwrap();
//! assert_eq!(scheduler.take_failures().len(), 1);
//! assert_eq!(scheduler.stats().macrotasks_run, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod continuation;
pub mod event_loop;
pub mod task_queue;

// Re-export main types at crate root
pub use context::TaskContext;
pub use continuation::Continuation;
pub use event_loop::{RunOutcome, Scheduler, SchedulerState, SchedulerStats};
pub use task_queue::{QueuedTask, Task, TaskQueue};

pub use core_types::{
    CallbackError, FailurePolicy, SchedulerConfig, SchedulerError, TaskFailure, TaskHandle,
    TaskId, TaskKind,
};
