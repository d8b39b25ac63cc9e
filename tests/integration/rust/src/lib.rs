//! Integration test suite for the cooperative task scheduler
//!
//! This crate provides integration tests that drive `async_runtime` the way
//! an embedding program would, plus a small output recorder standing in for
//! a console.

use std::sync::{Arc, Mutex};

/// Re-export components for test convenience
pub mod components {
    pub use async_runtime;
    pub use core_types;
}

/// Shared, cloneable line recorder.
///
/// Every clone appends to the same buffer, so callbacks can each hold one.
#[derive(Debug, Clone, Default)]
pub struct Console {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Console {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line.
    pub fn log(&self, line: impl Into<String>) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.into());
    }

    /// Snapshot of everything logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
