//! Backup validation: size and age policy applied to the latest backup.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::age::parse_age;
use crate::config::BackupConfig;
use crate::selector::select_latest;
use crate::storage::{ObjectLister, ObjectSummary};
use crate::verdict::{FailureReason, Verdict};
use crate::Result;

/// Validate one backup configuration against the store.
///
/// Lists once under the normalized prefix and never retries; a listing error
/// is returned as `Err` rather than folded into the verdict.
pub async fn validate(
    config: &BackupConfig,
    lister: &dyn ObjectLister,
    now: DateTime<Utc>,
) -> Result<Verdict> {
    if config.age.is_none() {
        return Ok(missing_age());
    }

    let prefix = config.normalized_prefix();
    let objects = lister.list_objects(&prefix).await?;
    debug!(
        "Listed {} objects under {} ({})",
        objects.len(),
        prefix,
        lister.backend_name()
    );

    Ok(evaluate(config, objects, now))
}

/// Apply the policy in `config` to an already fetched listing.
///
/// Checks run in a fixed order: age setting present, a matching object
/// exists, minimum size, then maximum age. The first failing check decides
/// the verdict, so an undersized backup reports `TooSmall` even when it is
/// also stale.
pub fn evaluate(config: &BackupConfig, objects: Vec<ObjectSummary>, now: DateTime<Utc>) -> Verdict {
    let Some(age_expression) = config.age_expression() else {
        return missing_age();
    };

    let Some(latest) = select_latest(objects, config.suffix_filter()) else {
        return Verdict::failure_with(
            FailureReason::FileNotFound,
            format!(
                "no object under `{}` matching suffix {:?}",
                config.normalized_prefix(),
                config.suffix_filter()
            ),
        );
    };
    debug!(
        "Latest backup is {} ({} bytes, modified {})",
        latest.key, latest.size_bytes, latest.last_modified
    );

    if let Some(min_size) = config.min_size {
        let size_kib = latest.size_bytes / 1024;
        if size_kib < min_size {
            return Verdict::failure_with(
                FailureReason::TooSmall,
                format!(
                    "{} is {} KiB, expected at least {} KiB",
                    latest.key, size_kib, min_size
                ),
            );
        }
    }

    let max_age_secs = match parse_age(&age_expression) {
        Ok(secs) => secs,
        Err(e) => {
            return Verdict::failure_with(FailureReason::ImproperlyConfigured, e.to_string());
        }
    };

    let elapsed = now.signed_duration_since(latest.last_modified);
    let max_age_ms = i64::try_from(max_age_secs)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    if elapsed.num_milliseconds() > max_age_ms {
        return Verdict::failure_with(
            FailureReason::TooOld,
            format!(
                "{} was modified {}s ago, limit is {}s",
                latest.key,
                elapsed.num_seconds(),
                max_age_secs
            ),
        );
    }

    Verdict::Ok
}

fn missing_age() -> Verdict {
    Verdict::failure_with(
        FailureReason::ImproperlyConfigured,
        "backup settings have no `age`",
    )
}
