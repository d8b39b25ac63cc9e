//! Scheduler configuration.
//!
//! # Example
//! ```
//! use core_types::{FailurePolicy, SchedulerConfig};
//!
//! let mut cfg = SchedulerConfig::default();
//! cfg.failure_policy = FailurePolicy::Propagate;
//! cfg.record_failures = false;
//!
//! assert_eq!(cfg.failure_policy, FailurePolicy::Propagate);
//! ```

use serde::{Deserialize, Serialize};

/// What the drive loop does when a callback returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the failure and keep going.
    #[default]
    Isolate,
    /// Report the failure, finish the current cycle, then return the first
    /// failure of that cycle to the caller.
    Propagate,
}

/// Configuration for a scheduler instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How callback failures are surfaced.
    pub failure_policy: FailurePolicy,
    /// Keep failures in an in-memory log readable with `take_failures`.
    pub record_failures: bool,
}

impl Default for SchedulerConfig {
    /// - `failure_policy = FailurePolicy::Isolate`
    /// - `record_failures = true`
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            record_failures: true,
        }
    }
}
