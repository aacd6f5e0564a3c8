//! Application state and dependency injection.

mod config;
mod health;
mod package;
mod token;

use std::sync::Arc;

use parcel_storage::ObjectStore;

pub use crate::service::config::{AuthConfig, ServiceConfig};
pub use crate::service::health::HealthMonitor;
pub use crate::service::package::PackageService;
pub use crate::service::token::{IssuedToken, TokenAuthority, TokenClaims};

/// Name and password accepted by the token endpoint.
#[derive(Clone)]
pub struct AdminAccount {
    user: Arc<str>,
    password: Arc<str>,
}

impl AdminAccount {
    /// Creates an account from plain credentials.
    pub fn new(user: impl Into<Arc<str>>, password: impl Into<Arc<str>>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Returns `true` when both values match.
    pub fn matches(&self, user: &str, password: &str) -> bool {
        *self.user == *user && *self.password == *password
    }
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pub packages: PackageService,
    pub tokens: TokenAuthority,
    pub health: HealthMonitor,
    pub admin: AdminAccount,
    pub max_archive_size: u64,
}

impl ServiceState {
    /// Builds the state around an already connected store.
    pub fn new(config: &ServiceConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            packages: PackageService::new(store.clone(), config.archive_validator()),
            tokens: TokenAuthority::new(config.auth.secret.as_bytes()),
            health: HealthMonitor::new(store, config.storage.bucket()),
            admin: AdminAccount::new(
                config.auth.admin_user.as_str(),
                config.auth.admin_password.as_str(),
            ),
            max_archive_size: config.max_archive_size,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(packages: PackageService);
impl_di!(tokens: TokenAuthority);
impl_di!(health: HealthMonitor);
impl_di!(admin: AdminAccount);
