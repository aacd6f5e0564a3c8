//! Tracing target constants for structured logging.
//!
//! Subscriber filters can select any of these, e.g.
//! `RUST_LOG=parcel_server::authentication=debug`.

/// Token verification and admin credential checks.
pub const TRACING_TARGET_AUTHENTICATION: &str = "parcel_server::authentication";

/// Token issuance.
pub const TRACING_TARGET_TOKENS: &str = "parcel_server::service::tokens";

/// Package uploads, reads and deletions.
pub const TRACING_TARGET_PACKAGES: &str = "parcel_server::service::packages";

/// Storage health checks.
pub const TRACING_TARGET_HEALTH: &str = "parcel_server::service::health";

/// Error recovery including middleware errors and request timeouts.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "parcel_server::recovery::error";

/// Panic recovery in handlers.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "parcel_server::recovery::panic";
