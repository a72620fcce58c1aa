//! Object listing trait definitions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StoreCredentials;
use crate::Result;

/// Maximum number of objects a single S3 `ListObjectsV2` page returns.
///
/// Listings are never extended past one page, so when more than this many
/// objects share a prefix the newest backup may not be among them.
pub const LISTING_PAGE_LIMIT: usize = 1000;

/// Metadata about a stored object, as returned by one listing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key
    pub key: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Last modified timestamp
    pub last_modified: DateTime<Utc>,
}

impl ObjectSummary {
    pub fn new(key: impl Into<String>, size_bytes: u64, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            size_bytes,
            last_modified,
        }
    }
}

/// Read-only listing of objects under a key prefix
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// List objects whose key starts with `prefix`, at most one page.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>>;

    /// Backend name used for metric labels.
    fn backend_name(&self) -> &str;
}

/// Builds a lister for a set of store credentials.
///
/// Credentials are re-read from the config file on every request, so a
/// lister is built per check rather than cached.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn ObjectLister>>;
}
