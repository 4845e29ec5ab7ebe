//! Tests for service limits.

use super::*;

#[test]
fn test_defaults_are_valid() {
    let limits = ServiceLimits::default();
    limits.validate().unwrap();

    assert_eq!(limits.max_body_bytes, 65_536);
    assert_eq!(limits.default_time_to_live_secs, 604_800);
    assert_eq!(limits.max_batch_size, 32);
    assert_eq!(limits.reconcile, ReconcileMode::OnAccess);
}

#[test]
fn test_validate_rejects_empty_visibility_range() {
    let limits = ServiceLimits {
        min_visibility_timeout_secs: 10,
        max_visibility_timeout_secs: 5,
        ..ServiceLimits::default()
    };

    assert!(matches!(
        limits.validate(),
        Err(QueueError::Configuration { .. })
    ));
}

#[test]
fn test_validate_rejects_zero_sweep_interval() {
    let limits = ServiceLimits {
        reconcile: ReconcileMode::Background { interval_secs: 0 },
        ..ServiceLimits::default()
    };

    assert!(matches!(
        limits.validate(),
        Err(QueueError::Configuration { .. })
    ));
}

#[test]
fn test_check_time_to_live() {
    let limits = ServiceLimits::default();

    assert!(limits.check_time_to_live(Duration::seconds(1)).is_ok());
    assert!(limits.check_time_to_live(Duration::days(7)).is_ok());
    assert!(limits.check_time_to_live(Duration::seconds(0)).is_err());
    assert!(limits.check_time_to_live(Duration::seconds(-5)).is_err());
    assert!(limits.check_time_to_live(Duration::days(8)).is_err());
}

#[test]
fn test_check_retrieve_visibility_requires_at_least_one_second() {
    let limits = ServiceLimits::default();

    assert!(limits
        .check_retrieve_visibility(Duration::seconds(0))
        .is_err());
    assert!(limits
        .check_retrieve_visibility(Duration::seconds(1))
        .is_ok());
    assert!(limits.check_retrieve_visibility(Duration::days(7)).is_ok());
    assert!(limits.check_retrieve_visibility(Duration::days(8)).is_err());
}

#[test]
fn test_check_update_visibility_allows_zero() {
    let limits = ServiceLimits::default();

    assert!(limits.check_update_visibility(Duration::seconds(0)).is_ok());
    assert!(limits
        .check_update_visibility(Duration::seconds(-1))
        .is_err());
}

#[test]
fn test_check_batch_size() {
    let limits = ServiceLimits::default();

    assert!(limits.check_batch_size(1).is_ok());
    assert!(limits.check_batch_size(32).is_ok());
    assert!(limits.check_batch_size(0).is_err());
    assert!(limits.check_batch_size(33).is_err());
}

#[test]
fn test_check_body_size_reports_bounds() {
    let limits = ServiceLimits::default();

    assert!(limits.check_body_size(65_536).is_ok());
    match limits.check_body_size(65_537) {
        Err(QueueError::PayloadTooLarge { size, max_size }) => {
            assert_eq!(size, 65_537);
            assert_eq!(max_size, 65_536);
        }
        other => panic!("expected PayloadTooLarge, got {other:?}"),
    }
}

#[test]
fn test_check_retention_days() {
    let limits = ServiceLimits::default();

    assert!(limits.check_retention_days(1).is_ok());
    assert!(limits.check_retention_days(365).is_ok());
    assert!(limits.check_retention_days(0).is_err());
    assert!(limits.check_retention_days(366).is_err());
}

#[test]
fn test_load_reads_environment_overrides() {
    // Single test owning the QV__ variable; env mutation is process-wide.
    std::env::set_var("QV__MAX_BATCH_SIZE", "16");
    let limits = ServiceLimits::load().unwrap();
    assert_eq!(limits.max_batch_size, 16);
    // Unset fields keep their defaults.
    assert_eq!(limits.max_body_bytes, 65_536);

    std::env::set_var("QV__MAX_BATCH_SIZE", "not-a-number");
    let result = ServiceLimits::load();
    assert!(matches!(result, Err(QueueError::Configuration { .. })));

    std::env::remove_var("QV__MAX_BATCH_SIZE");
    let limits = ServiceLimits::load().unwrap();
    assert_eq!(limits.max_batch_size, 32);
}

#[test]
fn test_reconcile_mode_deserializes_from_tagged_form() {
    let on_access: ReconcileMode = serde_json::from_str(r#"{"mode":"on_access"}"#).unwrap();
    assert_eq!(on_access, ReconcileMode::OnAccess);

    let background: ReconcileMode =
        serde_json::from_str(r#"{"mode":"background","interval_secs":5}"#).unwrap();
    assert_eq!(background, ReconcileMode::Background { interval_secs: 5 });
}
