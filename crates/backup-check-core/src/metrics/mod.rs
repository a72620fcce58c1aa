//! Prometheus metrics for backup checks.
//!
//! - [`labels`] - Label types for metric dimensions
//! - [`registry`] - The `CheckMetrics` registry
//! - [`instrumented_lister`] - Lister decorator recording store latency and errors
//!
//! The registry is served as text at `GET /metrics` by [`crate::server`].

pub mod instrumented_lister;
pub mod labels;
pub mod registry;

pub use instrumented_lister::InstrumentedLister;
pub use labels::{CheckLabels, StoreErrorLabels, StoreLabels, TargetLabels, UNKNOWN_LABEL};
pub use registry::{CheckMetrics, CheckTimer};
