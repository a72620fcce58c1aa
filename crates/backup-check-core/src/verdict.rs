//! Outcome of a backup check.

use std::fmt;

use serde::Serialize;

/// Reason a backup check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Backup settings are missing a required value or hold an invalid one
    ImproperlyConfigured,
    /// No backup settings under the requested name
    ConfigNotFound,
    /// No object matches the prefix and suffix
    FileNotFound,
    /// Latest backup is below the minimum size
    TooSmall,
    /// Latest backup is older than the age threshold
    TooOld,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ImproperlyConfigured => "improperly_configured",
            FailureReason::ConfigNotFound => "config_not_found",
            FailureReason::FileNotFound => "file_not_found",
            FailureReason::TooSmall => "too_small",
            FailureReason::TooOld => "too_old",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one backup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Ok,
    Failure {
        reason: FailureReason,
        detail: Option<String>,
    },
}

impl Verdict {
    pub fn failure(reason: FailureReason) -> Self {
        Verdict::Failure {
            reason,
            detail: None,
        }
    }

    pub fn failure_with(reason: FailureReason, detail: impl Into<String>) -> Self {
        Verdict::Failure {
            reason,
            detail: Some(detail.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Ok)
    }

    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Verdict::Ok => None,
            Verdict::Failure { reason, .. } => Some(*reason),
        }
    }

    /// Outcome label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Verdict::Ok => "ok",
            Verdict::Failure { reason, .. } => reason.as_str(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => f.write_str("ok"),
            Verdict::Failure {
                reason,
                detail: Some(detail),
            } => write!(f, "{}: {}", reason, detail),
            Verdict::Failure { reason, detail: None } => write!(f, "{}", reason),
        }
    }
}
