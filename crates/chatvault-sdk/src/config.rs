use std::path::{Path, PathBuf};
use std::time::Duration;

use chatvault_store::RetryPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Which [`ThreadStore`](crate::ThreadStore) implementation to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Blob namespace with a header index.
    #[default]
    Object,
    /// Plain directory, no index.
    Local,
}

/// Storage configuration, usually read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    pub object: ObjectConfig,
    pub local: LocalConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    /// Namespace holding the objects. With the directory transport this is
    /// the root directory.
    pub bucket: String,
    /// Prepended verbatim to every object key.
    pub prefix: Option<String>,
    /// Handed to the transport untouched.
    pub credential_path: Option<PathBuf>,
    pub read_attempts: u32,
    pub write_attempts: u32,
    /// Fixed pause between attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            bucket: "./bucket".into(),
            prefix: None,
            credential_path: None,
            read_attempts: RetryPolicy::DEFAULT_READ_ATTEMPTS,
            write_attempts: 1,
            retry_delay_ms: 0,
        }
    }
}

impl ObjectConfig {
    pub fn read_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.read_attempts).with_delay(self.retry_delay())
    }

    pub fn write_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.write_attempts).with_delay(self.retry_delay())
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub memory_directory: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            memory_directory: PathBuf::from("./memory"),
        }
    }
}

impl StorageConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SdkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the settings of the selected backend.
    pub fn validate(&self) -> SdkResult<()> {
        match self.backend {
            Backend::Object => {
                if self.object.bucket.trim().is_empty() {
                    return Err(SdkError::Config("object.bucket must not be empty".into()));
                }
                if self.object.read_attempts == 0 || self.object.write_attempts == 0 {
                    return Err(SdkError::Config(
                        "object.read_attempts and object.write_attempts must be at least 1".into(),
                    ));
                }
            }
            Backend::Local => {
                if self.local.memory_directory.as_os_str().is_empty() {
                    return Err(SdkError::Config(
                        "local.memory_directory must not be empty".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}
