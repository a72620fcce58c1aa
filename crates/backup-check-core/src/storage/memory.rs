//! In-memory object lister for testing.

use async_trait::async_trait;
use object_store::path::Path;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{ObjectLister, ObjectSummary, StoreConnector, StoreCredentials, LISTING_PAGE_LIMIT};
use crate::error::StorageError;
use crate::{Error, Result};

/// In-memory lister over a fixed set of object summaries.
///
/// Unlike `object_store::memory::InMemory`, last-modified timestamps are
/// chosen by the caller. Prefixes match whole path segments after
/// `object_store` path normalization, and listings come back in key order cut
/// at the page limit, the same as [`super::S3Lister`].
pub struct MemoryLister {
    objects: RwLock<Vec<ObjectSummary>>,
    page_limit: usize,
}

impl MemoryLister {
    /// Create an empty lister
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(Vec::new()),
            page_limit: LISTING_PAGE_LIMIT,
        }
    }

    /// Create a lister holding the given objects
    pub fn with_objects(objects: impl IntoIterator<Item = ObjectSummary>) -> Self {
        let lister = Self::new();
        lister.objects.write().extend(objects);
        lister
    }

    /// Override the number of objects returned per listing.
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Add an object, replacing any existing object with the same key
    pub fn insert(&self, object: ObjectSummary) {
        let mut objects = self.objects.write();
        objects.retain(|o| o.key != object.key);
        objects.push(object);
    }
}

impl Default for MemoryLister {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectLister for MemoryLister {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let prefix = Path::from(prefix);
        let mut matching: Vec<ObjectSummary> = self
            .objects
            .read()
            .iter()
            .filter(|o| {
                Path::from(o.key.as_str())
                    .prefix_match(&prefix)
                    .is_some_and(|mut rest| rest.next().is_some())
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.key.cmp(&b.key));
        matching.truncate(self.page_limit);
        Ok(matching)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

/// Connector resolving bucket names to in-memory listers.
#[derive(Default)]
pub struct MemoryConnector {
    buckets: RwLock<HashMap<String, Arc<MemoryLister>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bucket, returning the lister so tests can add objects later.
    pub fn add_bucket(&self, bucket: &str, lister: MemoryLister) -> Arc<MemoryLister> {
        let lister = Arc::new(lister);
        self.buckets
            .write()
            .insert(bucket.to_string(), Arc::clone(&lister));
        lister
    }
}

impl StoreConnector for MemoryConnector {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn ObjectLister>> {
        let buckets = self.buckets.read();
        let lister = buckets.get(&credentials.bucket_name).ok_or_else(|| {
            Error::Storage(StorageError::Backend(format!(
                "Bucket does not exist: {}",
                credentials.bucket_name
            )))
        })?;
        Ok(Arc::clone(lister) as Arc<dyn ObjectLister>)
    }
}
