//! S3-compatible object lister using object_store.

use async_trait::async_trait;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ClientOptions, ObjectStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{ObjectLister, ObjectSummary, StoreConnector, StoreCredentials, LISTING_PAGE_LIMIT};
use crate::error::StorageError;
use crate::{Error, Result};

/// Default bound on a single listing call.
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// S3 object lister
pub struct S3Lister {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    timeout: Duration,
    page_limit: usize,
}

impl S3Lister {
    /// Create a new S3 lister for the given credentials
    pub fn new(credentials: &StoreCredentials, timeout: Duration) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&credentials.bucket_name)
            .with_access_key_id(&credentials.access_key)
            .with_secret_access_key(&credentials.secret_key)
            .with_client_options(ClientOptions::new().with_timeout(timeout));

        if let Some(region) = &credentials.region {
            builder = builder.with_region(region);
        }

        if let Some(endpoint) = &credentials.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false);
        }

        if credentials.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            Error::Storage(StorageError::InvalidConfig(format!(
                "Failed to create S3 client for bucket {}: {}",
                credentials.bucket_name, e
            )))
        })?;

        Ok(Self {
            store: Arc::new(store),
            bucket: credentials.bucket_name.clone(),
            timeout,
            page_limit: LISTING_PAGE_LIMIT,
        })
    }

    /// Wrap an existing store, e.g. `object_store::memory::InMemory`.
    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            timeout: DEFAULT_LIST_TIMEOUT,
            page_limit: LISTING_PAGE_LIMIT,
        }
    }

    /// Override the bound on a single listing.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the number of objects kept from a listing.
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    async fn collect_page(&self, prefix: &Path) -> Result<Vec<ObjectSummary>> {
        let mut stream = self.store.list(Some(prefix)).take(self.page_limit);
        let mut objects = Vec::new();

        while let Some(result) = stream.next().await {
            let meta = result.map_err(|e| {
                Error::Storage(StorageError::Backend(format!("S3 LIST failed: {}", e)))
            })?;
            objects.push(ObjectSummary {
                key: meta.location.to_string(),
                size_bytes: meta.size as u64,
                last_modified: meta.last_modified,
            });
        }

        Ok(objects)
    }
}

#[async_trait]
impl ObjectLister for S3Lister {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        // object_store paths carry no leading or trailing delimiter, and list
        // whole path segments, which matches a raw prefix ending in `/`.
        let path = Path::from(prefix);
        debug!("S3 LIST: s3://{}/{}", self.bucket, path);

        let objects = tokio::time::timeout(self.timeout, self.collect_page(&path))
            .await
            .map_err(|_| Error::Storage(StorageError::Timeout(self.timeout)))??;

        debug!(
            "S3 LIST returned {} objects under s3://{}/{}",
            objects.len(),
            self.bucket,
            path
        );
        Ok(objects)
    }

    fn backend_name(&self) -> &str {
        "s3"
    }
}

/// Connector building an [`S3Lister`] per set of credentials.
#[derive(Debug, Clone)]
pub struct S3Connector {
    timeout: Duration,
}

impl S3Connector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for S3Connector {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_TIMEOUT)
    }
}

impl StoreConnector for S3Connector {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn ObjectLister>> {
        Ok(Arc::new(S3Lister::new(credentials, self.timeout)?))
    }
}
