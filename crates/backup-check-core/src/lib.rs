//! Backup Check Core Library
//!
//! Decides whether the latest backup in an object store bucket is recent
//! enough and large enough, and serves those decisions over HTTP for uptime
//! monitors.

pub mod age;
pub mod checker;
pub mod config;
pub mod error;
pub mod metrics;
pub mod selector;
pub mod server;
pub mod storage;
pub mod validator;
pub mod verdict;

pub use age::{parse_age, AgeUnit};
pub use checker::BackupChecker;
pub use config::{AgeSetting, BackupConfig, EnvironmentConfig, MonitorConfig};
pub use error::{Error, Result, StorageError};
pub use metrics::{CheckMetrics, InstrumentedLister};
pub use selector::select_latest;
pub use server::{render_verdict, CheckServer, CheckServerConfig, DEFAULT_PORT};
pub use storage::{
    MemoryConnector, MemoryLister, ObjectLister, ObjectSummary, S3Connector, S3Lister,
    StoreConnector, StoreCredentials, LISTING_PAGE_LIMIT,
};
pub use validator::{evaluate, validate};
pub use verdict::{FailureReason, Verdict};
