use anyhow::{Context, anyhow};
#[cfg(feature = "config")]
use clap::Args;
use parcel_core::archive::ArchiveValidator;
use parcel_storage::StorageConfig;
use serde::{Deserialize, Serialize};

/// Credentials that guard token issuance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct AuthConfig {
    /// Shared secret used to sign and verify HS256 tokens.
    #[cfg_attr(feature = "config", arg(long, env = "SECRET", hide_env_values = true))]
    #[serde(skip_serializing)]
    pub secret: String,

    /// User name accepted by `POST /tokens`.
    #[cfg_attr(feature = "config", arg(long, env = "ADMIN_USER"))]
    pub admin_user: String,

    /// Password accepted by `POST /tokens`.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub admin_password: String,
}

impl AuthConfig {
    /// Validates that the secret and the admin credentials are present.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret.trim().is_empty() {
            return Err(anyhow!("Token secret must not be empty."));
        }

        if self.admin_user.trim().is_empty() || self.admin_password.is_empty() {
            return Err(anyhow!(
                "Admin user and password must both be set to issue tokens."
            ));
        }

        Ok(())
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Object storage connection.
    #[cfg_attr(feature = "config", command(flatten))]
    pub storage: StorageConfig,

    /// Token signing and admin credentials.
    #[cfg_attr(feature = "config", command(flatten))]
    pub auth: AuthConfig,

    /// Largest archive accepted by `POST /packages`, in bytes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_ARCHIVE_SIZE", default_value_t = ArchiveValidator::DEFAULT_MAX_SIZE)
    )]
    pub max_archive_size: u64,
}

impl ServiceConfig {
    /// Returns the validator enforcing [`max_archive_size`](Self::max_archive_size).
    #[inline]
    pub fn archive_validator(&self) -> ArchiveValidator {
        ArchiveValidator::new(self.max_archive_size)
    }

    /// Validates every configuration group.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage backend is missing its connection
    /// settings, when the token secret or admin credentials are empty, or when
    /// the archive size limit is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.storage
            .validate()
            .context("error while creating object storage client")?;
        self.auth.validate().context("invalid auth configuration")?;

        if self.max_archive_size == 0 {
            return Err(anyhow!("Maximum archive size must be greater than zero."));
        }

        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            max_archive_size: ArchiveValidator::DEFAULT_MAX_SIZE,
        }
    }
}
