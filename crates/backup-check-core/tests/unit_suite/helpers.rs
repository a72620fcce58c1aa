//! Test helper utilities.
//!
//! Provides fixture objects, config files, store connectors and an HTTP
//! client used across the unit suite.

use backup_check_core::{
    MemoryConnector, MemoryLister, ObjectLister, ObjectSummary, Result, S3Lister, StoreConnector,
    StoreCredentials,
};
use chrono::{DateTime, Duration, Utc};
use object_store::memory::InMemory;
use object_store::throttle::{ThrottleConfig, ThrottledStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Bucket name used by [`SAMPLE_CONFIG`]
pub const BUCKET: &str = "prod-backups";

/// Config with a `prod` environment and a `db` backup needing a daily dump
/// of at least 100 KiB
pub const SAMPLE_CONFIG: &str = r#"{
    "prod": {
        "bucket_name": "prod-backups",
        "access_key": "AKIAEXAMPLE",
        "secret_key": "example",
        "region": "eu-west-1",
        "backups": {
            "db": {"age": "1D", "prefix": "postgres", "suffix": ".sql.gz", "min_size": 100},
            "media": {"age": "2W", "prefix": "media/"}
        }
    }
}"#;

/// Create an object modified `hours_ago` hours before `now`
pub fn object_aged(key: &str, now: DateTime<Utc>, hours_ago: i64, size_kib: u64) -> ObjectSummary {
    ObjectSummary::new(key, size_kib * 1024, now - Duration::hours(hours_ago))
}

/// Connector serving [`BUCKET`] with the given objects
pub fn connector_with(objects: Vec<ObjectSummary>) -> MemoryConnector {
    let connector = MemoryConnector::new();
    connector.add_bucket(BUCKET, MemoryLister::with_objects(objects));
    connector
}

/// Write `content` as `config.json` in a fresh temporary directory
pub fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

/// Connector whose listings take `delay` against a lister bounded by
/// `timeout`
pub struct SlowStoreConnector {
    pub delay: std::time::Duration,
    pub timeout: std::time::Duration,
}

impl StoreConnector for SlowStoreConnector {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn ObjectLister>> {
        let store = ThrottledStore::new(
            InMemory::new(),
            ThrottleConfig {
                wait_list_per_call: self.delay,
                ..Default::default()
            },
        );
        let lister = S3Lister::from_store(Arc::new(store), credentials.bucket_name.clone())
            .with_timeout(self.timeout);
        Ok(Arc::new(lister))
    }
}

/// GET `target` from the server at `addr`, returning the status code and body
pub async fn http_get(addr: SocketAddr, target: &str) -> (u16, String) {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap();
    let response = client
        .get(format!("http://{}{}", addr, target))
        .send()
        .await
        .unwrap();

    let status = response.status().as_u16();
    let body = response.text().await.unwrap();
    (status, body)
}
