//! Convenience re-exports for embedding the server.

pub use crate::handler::{Error, ErrorKind, Result, routes};
pub use crate::middleware::{
    CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
pub use crate::service::{ServiceConfig, ServiceState};
