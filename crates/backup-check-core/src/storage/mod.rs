//! Object store access.
//!
//! Backup checks only ever list objects, so the store abstraction is a
//! single read-only [`ObjectLister`] trait with two implementations:
//!
//! - **S3**: AWS S3 and S3-compatible services (MinIO, Ceph RGW, etc.)
//! - **Memory**: fixed listings (for testing)

mod backend;
mod config;
mod memory;
mod s3;

pub use backend::{ObjectLister, ObjectSummary, StoreConnector, LISTING_PAGE_LIMIT};
pub use config::StoreCredentials;
pub use memory::{MemoryConnector, MemoryLister};
pub use s3::{S3Connector, S3Lister, DEFAULT_LIST_TIMEOUT};
