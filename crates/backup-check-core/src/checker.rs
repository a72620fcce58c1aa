//! Resolution of a named backup within an environment, followed by validation.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::config::EnvironmentConfig;
use crate::error::StorageError;
use crate::metrics::{CheckMetrics, InstrumentedLister};
use crate::storage::{ObjectLister, StoreConnector};
use crate::validator::validate;
use crate::verdict::{FailureReason, Verdict};
use crate::{Error, Result};

/// Runs checks for backups of one environment.
#[derive(Clone)]
pub struct BackupChecker {
    connector: Arc<dyn StoreConnector>,
    metrics: Option<Arc<CheckMetrics>>,
}

impl BackupChecker {
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            connector,
            metrics: None,
        }
    }

    /// Record store latency and errors into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<CheckMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Check the backup named `service` in `environment`.
    ///
    /// An unknown name is a `ConfigNotFound` verdict. Settings that do not
    /// decode, or credentials the store client rejects outright, are
    /// `ImproperlyConfigured`. Listing failures are returned as `Err`.
    pub async fn check(
        &self,
        environment: &EnvironmentConfig,
        service: &str,
        now: DateTime<Utc>,
    ) -> Result<Verdict> {
        let backup = match environment.backup(service) {
            None => {
                return Ok(Verdict::failure_with(
                    FailureReason::ConfigNotFound,
                    format!("no backup settings named `{}`", service),
                ));
            }
            Some(Err(e)) => {
                return Ok(Verdict::failure_with(
                    FailureReason::ImproperlyConfigured,
                    e.to_string(),
                ));
            }
            Some(Ok(backup)) => backup,
        };

        let lister = match self.connector.connect(&environment.store) {
            Ok(lister) => lister,
            Err(Error::Storage(StorageError::InvalidConfig(message))) => {
                return Ok(Verdict::failure_with(
                    FailureReason::ImproperlyConfigured,
                    message,
                ));
            }
            Err(e) => return Err(e),
        };
        let lister: Arc<dyn ObjectLister> = match &self.metrics {
            Some(metrics) => Arc::new(InstrumentedLister::new(lister, Arc::clone(metrics))),
            None => lister,
        };

        debug!(
            "Checking `{}` in bucket {}",
            service, environment.store.bucket_name
        );
        validate(&backup, lister.as_ref(), now).await
    }
}
