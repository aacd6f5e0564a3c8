//! Backend selection and S3 connection settings.

#[cfg(feature = "config")]
use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::{StorageError, StorageResult};

/// Default bucket holding every package.
pub const DEFAULT_BUCKET: &str = "parcel";

/// Default bucket region.
pub const DEFAULT_LOCATION: &str = "us-east-1";

/// Backing store implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3 compatible object storage.
    #[default]
    S3,
    /// Process-local memory; contents are lost on exit.
    Memory,
}

/// Object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct StorageConfig {
    /// Which backend to connect to.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORAGE_BACKEND", value_enum, default_value = "s3")
    )]
    pub backend: StorageBackend,

    /// S3 endpoint as `host[:port]`, without scheme.
    #[cfg_attr(feature = "config", arg(long, env = "S3_URL"))]
    pub s3_url: Option<String>,

    /// S3 access key.
    #[cfg_attr(feature = "config", arg(long, env = "S3_KEY"))]
    pub s3_key: Option<String>,

    /// S3 secret key.
    #[cfg_attr(feature = "config", arg(long, env = "S3_SECRET", hide_env_values = true))]
    #[serde(skip_serializing)]
    pub s3_secret: Option<String>,

    /// Bucket holding every package.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "S3_BUCKET_NAME", default_value = DEFAULT_BUCKET)
    )]
    pub s3_bucket_name: String,

    /// Bucket region, used when the bucket is created.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "S3_LOCATION", default_value = DEFAULT_LOCATION)
    )]
    pub s3_location: String,

    /// Whether to reach the endpoint over TLS.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "S3_SSL", default_value = "true", action = ArgAction::Set)
    )]
    pub s3_ssl: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            s3_url: None,
            s3_key: None,
            s3_secret: None,
            s3_bucket_name: DEFAULT_BUCKET.to_owned(),
            s3_location: DEFAULT_LOCATION.to_owned(),
            s3_ssl: true,
        }
    }
}

impl StorageConfig {
    /// Creates an in-memory configuration.
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            ..Self::default()
        }
    }

    /// Returns the bucket name.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.s3_bucket_name
    }

    /// Returns the bucket region.
    #[inline]
    pub fn location(&self) -> &str {
        &self.s3_location
    }

    /// Returns the endpoint URL with its scheme, e.g. `https://s3.example.com`.
    pub fn endpoint(&self) -> StorageResult<String> {
        let host = non_empty(self.s3_url.as_deref())
            .ok_or_else(|| StorageError::Init("S3_URL is not set".into()))?;

        let scheme = if self.s3_ssl { "https" } else { "http" };
        Ok(format!("{scheme}://{}", host.trim_end_matches('/')))
    }

    /// Returns the access and secret key pair.
    pub fn credentials(&self) -> StorageResult<(&str, &str)> {
        let key = non_empty(self.s3_key.as_deref())
            .ok_or_else(|| StorageError::Init("S3_KEY is not set".into()))?;
        let secret = non_empty(self.s3_secret.as_deref())
            .ok_or_else(|| StorageError::Init("S3_SECRET is not set".into()))?;
        Ok((key, secret))
    }

    /// Validates the settings required by the selected backend.
    pub fn validate(&self) -> StorageResult<()> {
        if self.s3_bucket_name.trim().is_empty() {
            return Err(StorageError::Init("bucket name cannot be empty".into()));
        }

        if self.backend == StorageBackend::S3 {
            self.endpoint()?;
            self.credentials()?;

            if self.s3_url.as_deref().is_some_and(|url| url.contains("://")) {
                return Err(StorageError::Init(
                    "S3_URL must not include a scheme, use S3_SSL instead".into(),
                ));
            }
        }

        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
