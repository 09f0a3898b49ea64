//! Session store configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where session facets live
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the file backend
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Connection URL for the redis backend
    pub redis_url: Option<String>,

    /// Idle expiry for redis keys; unset keeps sessions until purged
    pub redis_ttl_secs: Option<u64>,
}

/// Session store backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
    Redis,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.backend {
            StorageBackend::Memory => Ok(()),
            StorageBackend::File => {
                if self.path.as_os_str().is_empty() {
                    return Err(ValidationError::MissingRequired("STORAGE__PATH"));
                }
                Ok(())
            }
            StorageBackend::Redis => {
                let url = self
                    .redis_url
                    .as_deref()
                    .filter(|url| !url.is_empty())
                    .ok_or(ValidationError::MissingRequired("STORAGE__REDIS_URL"))?;
                if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                    return Err(ValidationError::InvalidRedisUrl);
                }
                Ok(())
            }
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_path(),
            redis_url: None,
            redis_ttl_secs: None,
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/sessions")
}
