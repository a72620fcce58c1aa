//! Prometheus metrics registry for backup checks.

use parking_lot::RwLock;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;
use std::time::Instant;

use super::labels::{CheckLabels, StoreErrorLabels, StoreLabels, TargetLabels};

/// Store listing latency histogram buckets (in seconds).
/// Covers typical object store latencies: 10ms to 30s.
const STORE_LATENCY_BUCKETS: [f64; 10] = [0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Whole-check duration histogram buckets (in seconds).
const CHECK_DURATION_BUCKETS: [f64; 9] = [0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0, 30.0];

/// Prometheus metrics for the check server.
pub struct CheckMetrics {
    /// Internal prometheus-client registry.
    registry: RwLock<Registry>,

    /// Checks by environment, service and outcome.
    pub checks_total: Family<CheckLabels, Counter>,

    /// End-to-end check duration.
    pub check_duration_seconds: Family<TargetLabels, Histogram>,

    /// Object store listing latency.
    pub store_list_latency_seconds: Family<StoreLabels, Histogram>,

    /// Object store errors by type.
    pub store_errors_total: Family<StoreErrorLabels, Counter>,
}

impl Default for CheckMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let checks_total = Family::<CheckLabels, Counter>::default();
        let check_duration_seconds =
            Family::<TargetLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(CHECK_DURATION_BUCKETS.iter().cloned())
            });
        let store_list_latency_seconds =
            Family::<StoreLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(STORE_LATENCY_BUCKETS.iter().cloned())
            });
        let store_errors_total = Family::<StoreErrorLabels, Counter>::default();

        registry.register(
            "backup_check_checks",
            "Backup checks by environment, service and outcome",
            checks_total.clone(),
        );
        registry.register(
            "backup_check_duration_seconds",
            "End-to-end backup check duration",
            check_duration_seconds.clone(),
        );
        registry.register(
            "backup_check_store_list_latency_seconds",
            "Object store listing latency by backend",
            store_list_latency_seconds.clone(),
        );
        registry.register(
            "backup_check_store_errors",
            "Object store errors by backend and type",
            store_errors_total.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            checks_total,
            check_duration_seconds,
            store_list_latency_seconds,
            store_errors_total,
        }
    }

    /// Record the outcome of one check.
    pub fn record_check(&self, environment: &str, service: &str, outcome: &str, seconds: f64) {
        self.checks_total
            .get_or_create(&CheckLabels::new(environment, service, outcome))
            .inc();
        self.check_duration_seconds
            .get_or_create(&TargetLabels::new(environment, service))
            .observe(seconds);
    }

    pub fn record_list_latency(&self, backend: &str, seconds: f64) {
        self.store_list_latency_seconds
            .get_or_create(&StoreLabels::new(backend))
            .observe(seconds);
    }

    pub fn record_store_error(&self, backend: &str, error_type: &str) {
        self.store_errors_total
            .get_or_create(&StoreErrorLabels::new(backend, error_type))
            .inc();
    }

    /// Encode all metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        let registry = self.registry.read();
        let mut buffer = String::new();
        if encode(&mut buffer, &registry).is_err() {
            return String::new();
        }
        buffer
    }
}

/// RAII guard recording elapsed time into the check duration histogram.
///
/// The outcome counter is bumped by [`CheckTimer::finish`]; a guard dropped
/// without finishing (e.g. on a store error) records under `outcome`
/// `"error"`.
pub struct CheckTimer<'a> {
    metrics: &'a CheckMetrics,
    environment: String,
    service: String,
    start: Instant,
    finished: bool,
}

impl<'a> CheckTimer<'a> {
    pub fn start(
        metrics: &'a CheckMetrics,
        environment: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            metrics,
            environment: environment.into(),
            service: service.into(),
            start: Instant::now(),
            finished: false,
        }
    }

    pub fn finish(mut self, outcome: &str) {
        self.record(outcome);
        self.finished = true;
    }

    fn record(&self, outcome: &str) {
        self.metrics.record_check(
            &self.environment,
            &self.service,
            outcome,
            self.start.elapsed().as_secs_f64(),
        );
    }
}

impl Drop for CheckTimer<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.record("error");
        }
    }
}
