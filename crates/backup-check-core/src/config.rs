//! Monitor configuration: environments, store credentials and backup settings.
//!
//! The config file is a JSON object whose keys are environment names, plus
//! an optional top-level `token`:
//!
//! ```json
//! {
//!   "token": "s3cr3t",
//!   "prod": {
//!     "bucket_name": "prod-backups",
//!     "access_key": "AKIA...",
//!     "secret_key": "...",
//!     "region": "eu-west-1",
//!     "backups": {
//!       "db": { "age": "1D", "prefix": "postgres", "suffix": ".sql.gz", "min_size": 100 }
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::storage::StoreCredentials;
use crate::{Error, Result};

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Shared secret required as `?token=` on every check, if set
    #[serde(default)]
    pub token: Option<String>,

    /// Environment blocks, decoded on lookup so that one broken environment
    /// does not make the whole file unusable
    #[serde(flatten)]
    environments: HashMap<String, serde_json::Value>,
}

impl MonitorConfig {
    /// Read and decode the config file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| Error::ConfigFileMissing {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether a request carrying `supplied` as its token may run a check.
    pub fn authorize(&self, supplied: Option<&str>) -> bool {
        match self.token.as_deref() {
            None | Some("") => true,
            Some(expected) => supplied == Some(expected),
        }
    }

    /// Look up an environment.
    ///
    /// Returns `None` for an unknown name and `Some(Err(Error::Config))`
    /// when the environment block is missing required fields.
    pub fn environment(&self, name: &str) -> Option<Result<EnvironmentConfig>> {
        let raw = self.environments.get(name)?;
        Some(
            EnvironmentConfig::deserialize(raw)
                .map_err(|e| Error::Config(format!("environment `{}`: {}", name, e))),
        )
    }

    /// Names of all configured environments.
    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }
}

/// Settings for one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Bucket and credentials holding this environment's backups
    #[serde(flatten)]
    pub store: StoreCredentials,

    /// Backup settings by name, decoded on lookup so that one broken entry
    /// does not affect its siblings
    #[serde(default)]
    pub backups: HashMap<String, serde_json::Value>,
}

impl EnvironmentConfig {
    /// Look up the settings of one backup.
    ///
    /// Returns `None` for an unknown name and `Some(Err(Error::Config))`
    /// when the entry does not decode.
    pub fn backup(&self, name: &str) -> Option<Result<BackupConfig>> {
        let raw = self.backups.get(name)?;
        Some(
            BackupConfig::deserialize(raw)
                .map_err(|e| Error::Config(format!("backup `{}`: {}", name, e))),
        )
    }

    /// Add or replace the settings of one backup.
    pub fn insert_backup(&mut self, name: impl Into<String>, backup: &BackupConfig) -> Result<()> {
        self.backups.insert(name.into(), serde_json::to_value(backup)?);
        Ok(())
    }
}

/// Age threshold as written in the config file.
///
/// A bare number is read the same way as a unit-less string (hours).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeSetting {
    Expression(String),
    Hours(u64),
}

impl AgeSetting {
    pub fn expression(&self) -> String {
        match self {
            AgeSetting::Expression(expr) => expr.clone(),
            AgeSetting::Hours(hours) => hours.to_string(),
        }
    }
}

/// Settings describing how to judge one kind of backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Maximum age of the latest backup (e.g., "1D", "12H", "30M", "24")
    #[serde(default)]
    pub age: Option<AgeSetting>,

    /// Key prefix to list under
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Required key suffix (e.g., ".sql.gz")
    #[serde(default)]
    pub suffix: Option<String>,

    /// Minimum size in KiB
    #[serde(default)]
    pub min_size: Option<u64>,
}

fn default_prefix() -> String {
    "/".to_string()
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            age: None,
            prefix: default_prefix(),
            suffix: None,
            min_size: None,
        }
    }
}

impl BackupConfig {
    /// Config with only an age threshold set
    pub fn with_age(age: impl Into<String>) -> Self {
        Self {
            age: Some(AgeSetting::Expression(age.into())),
            ..Default::default()
        }
    }

    pub fn age_expression(&self) -> Option<String> {
        self.age.as_ref().map(AgeSetting::expression)
    }

    /// Prefix guaranteed to end with `/`
    pub fn normalized_prefix(&self) -> String {
        if self.prefix.ends_with('/') {
            self.prefix.clone()
        } else {
            format!("{}/", self.prefix)
        }
    }

    /// Suffix filter, with an empty string meaning no filter
    pub fn suffix_filter(&self) -> Option<&str> {
        self.suffix.as_deref().filter(|s| !s.is_empty())
    }
}
