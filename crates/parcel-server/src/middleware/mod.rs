//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Authentication of bearer tokens
//! - Security (CORS, headers, body limits)
//! - Observability (tracing spans, request IDs)
//! - Recovery (panics, timeouts, service errors)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use axum::Router;
//! use parcel_server::middleware::{
//!     RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app = Router::new()
//!     .with_default_security()
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod authentication;
mod observability;
mod recovery;
mod security;

pub use authentication::{RouterAuthExt, require_authentication};
pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
