//! Object store credentials.

use serde::{Deserialize, Serialize};

/// Credentials and location of the bucket holding an environment's backups.
///
/// Field names follow the keys of an environment block in the config file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCredentials {
    /// Bucket name
    pub bucket_name: String,
    /// Access key ID
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// AWS region (e.g., "us-east-1")
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint URL (for S3-compatible services like MinIO)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Allow HTTP (insecure) connections
    #[serde(default)]
    pub allow_http: bool,
}

impl std::fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("bucket_name", &self.bucket_name)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("allow_http", &self.allow_http)
            .finish()
    }
}
