//! Validation scenarios through the public API.

use backup_check_core::{
    evaluate, parse_age, select_latest, validate, BackupChecker, BackupConfig, FailureReason,
    MemoryLister, MonitorConfig, ObjectLister, Verdict,
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

use super::helpers::{connector_with, object_aged, SAMPLE_CONFIG};

fn db_policy() -> BackupConfig {
    BackupConfig {
        min_size: Some(100),
        ..BackupConfig::with_age("1D")
    }
}

#[test]
fn test_age_examples() {
    assert_eq!(parse_age("1D").unwrap(), 86_400);
    assert_eq!(parse_age("2W").unwrap(), 1_209_600);
    assert_eq!(parse_age("5").unwrap(), 5 * 3600);
    assert!(parse_age("10X").is_err());
}

#[test]
fn test_end_to_end_scenarios() {
    let now = Utc.with_ymd_and_hms(2024, 9, 1, 6, 0, 0).unwrap();

    let stale = evaluate(&db_policy(), vec![object_aged("db/a", now, 50, 200)], now);
    assert_eq!(stale.reason(), Some(FailureReason::TooOld));

    let small = evaluate(&db_policy(), vec![object_aged("db/a", now, 10, 50)], now);
    assert_eq!(small.reason(), Some(FailureReason::TooSmall));

    let fine = evaluate(&db_policy(), vec![object_aged("db/a", now, 10, 200)], now);
    assert_eq!(fine, Verdict::Ok);
}

#[test]
fn test_size_precedes_age_for_any_threshold() {
    let now = Utc.with_ymd_and_hms(2024, 9, 1, 6, 0, 0).unwrap();
    for min_kib in [1u64, 10, 100, 4096] {
        let policy = BackupConfig {
            min_size: Some(min_kib),
            ..BackupConfig::with_age("1H")
        };
        let object = backup_check_core::ObjectSummary::new(
            "db/a",
            min_kib * 1024 - 1,
            now - chrono::Duration::hours(5),
        );
        assert_eq!(
            evaluate(&policy, vec![object], now).reason(),
            Some(FailureReason::TooSmall),
            "min_size {}",
            min_kib
        );
    }
}

#[test]
fn test_selection_ignores_newer_unmatched_keys() {
    let now = Utc::now();
    let objects = vec![
        object_aged("postgres/2024-08-30.sql.gz", now, 48, 300),
        object_aged("postgres/2024-08-31.sql.gz", now, 24, 300),
        object_aged("postgres/restore.log", now, 1, 1),
    ];
    let latest = select_latest(objects, Some(".sql.gz")).unwrap();
    assert_eq!(latest.key, "postgres/2024-08-31.sql.gz");
}

#[tokio::test]
async fn test_validate_only_sees_first_page() {
    let now = Utc::now();
    // Keys sort so that the newest dump falls past the page limit
    let lister = MemoryLister::with_objects(vec![
        object_aged("db/a.sql.gz", now, 30, 300),
        object_aged("db/b.sql.gz", now, 29, 300),
        object_aged("db/c.sql.gz", now, 1, 300),
    ])
    .with_page_limit(2);

    let policy = BackupConfig {
        prefix: "db".to_string(),
        ..BackupConfig::with_age("1D")
    };
    let listing = lister.list_objects("db/").await.unwrap();
    assert_eq!(listing.len(), 2);

    let verdict = validate(&policy, &lister, now).await.unwrap();
    assert_eq!(verdict.reason(), Some(FailureReason::TooOld));
}

#[tokio::test]
async fn test_checker_with_sample_config() {
    let now = Utc::now();
    let config = MonitorConfig::from_json(SAMPLE_CONFIG).unwrap();
    let prod = config.environment("prod").unwrap().unwrap();

    let connector = connector_with(vec![
        object_aged("postgres/2024-08-31.sql.gz", now, 3, 512),
        object_aged("media/photos.tar", now, 24 * 20, 10_000),
    ]);
    let checker = BackupChecker::new(Arc::new(connector));

    assert!(checker.check(&prod, "db", now).await.unwrap().is_ok());
    assert_eq!(
        checker.check(&prod, "media", now).await.unwrap().reason(),
        Some(FailureReason::TooOld)
    );
    assert_eq!(
        checker.check(&prod, "redis", now).await.unwrap().reason(),
        Some(FailureReason::ConfigNotFound)
    );
}
