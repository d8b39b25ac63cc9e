//! Unit tests for SchedulerConfig

use core_types::{FailurePolicy, SchedulerConfig};

#[test]
fn test_default_policy_isolates_failures() {
    assert_eq!(FailurePolicy::default(), FailurePolicy::Isolate);
}

#[test]
fn test_config_serializes_snake_case() {
    let cfg = SchedulerConfig {
        failure_policy: FailurePolicy::Propagate,
        record_failures: false,
    };
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(
        json,
        r#"{"failure_policy":"propagate","record_failures":false}"#
    );
}

#[test]
fn test_empty_config_is_default() {
    let cfg: SchedulerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, SchedulerConfig::default());
}
