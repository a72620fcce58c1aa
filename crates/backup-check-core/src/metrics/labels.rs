//! Label types for Prometheus metrics.

use prometheus_client::encoding::EncodeLabelSet;

/// Placeholder for environment or service names that are not in the
/// config file. Request paths are caller controlled, so they only become
/// label values once they are known to exist.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Labels for check outcome counters.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CheckLabels {
    pub environment: String,
    pub service: String,
    pub outcome: String,
}

impl CheckLabels {
    pub fn new(
        environment: impl Into<String>,
        service: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            service: service.into(),
            outcome: outcome.into(),
        }
    }
}

/// Labels for check duration histograms.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TargetLabels {
    pub environment: String,
    pub service: String,
}

impl TargetLabels {
    pub fn new(environment: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            service: service.into(),
        }
    }
}

/// Labels for store listing latency.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StoreLabels {
    pub backend: String,
}

impl StoreLabels {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
        }
    }
}

/// Labels for store error counters.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StoreErrorLabels {
    pub backend: String,
    pub error_type: String,
}

impl StoreErrorLabels {
    pub fn new(backend: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            error_type: error_type.into(),
        }
    }
}
