//! Instrumented lister decorator.
//!
//! Wraps any `ObjectLister` and records listing latency and errors.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::registry::CheckMetrics;
use crate::storage::{ObjectLister, ObjectSummary};
use crate::{Error, Result};

/// A lister wrapper that records metrics for every listing.
pub struct InstrumentedLister {
    /// The wrapped lister.
    inner: Arc<dyn ObjectLister>,

    /// Reference to the Prometheus metrics registry.
    metrics: Arc<CheckMetrics>,
}

impl InstrumentedLister {
    pub fn new(inner: Arc<dyn ObjectLister>, metrics: Arc<CheckMetrics>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl ObjectLister for InstrumentedLister {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let start = Instant::now();
        let result = self.inner.list_objects(prefix).await;
        let backend = self.inner.backend_name();

        self.metrics
            .record_list_latency(backend, start.elapsed().as_secs_f64());

        if let Err(ref e) = result {
            let error_type = match e {
                Error::Storage(storage) => storage.kind(),
                _ => "other",
            };
            self.metrics.record_store_error(backend, error_type);
        }

        result
    }

    fn backend_name(&self) -> &str {
        self.inner.backend_name()
    }
}
