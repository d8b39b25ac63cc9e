//! Contract test suite for async_runtime
