//! Shared types for the cooperative task scheduler.
//!
//! This crate provides the vocabulary used across components: task identity,
//! the error taxonomy, and scheduler configuration.
//!
//! # Overview
//!
//! - [`TaskId`], [`TaskKind`], [`TaskHandle`] - Identity of an enqueued task
//! - [`CallbackError`] - Failure returned by a task callback
//! - [`SchedulerError`] - Failure returned by the drive loop
//! - [`TaskFailure`] - A callback failure tagged with its task
//! - [`SchedulerConfig`], [`FailurePolicy`] - Scheduler configuration
//!
//! # Examples
//!
//! ```
//! use core_types::{CallbackError, TaskHandle, TaskId, TaskKind};
//!
//! let handle = TaskHandle::new(TaskId::new(1), TaskKind::Macrotask);
//! assert_eq!(handle.to_string(), "macrotask #1");
//!
//! let err = CallbackError::new("undefined is not a function");
//! assert_eq!(err.message(), "undefined is not a function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod config;
mod error;
mod task;

pub use config::{FailurePolicy, SchedulerConfig};
pub use error::{CallbackError, SchedulerError, TaskFailure};
pub use task::{TaskHandle, TaskId, TaskKind};
