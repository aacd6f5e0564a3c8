//! Shared constants used across handlers and middleware.

pub mod tracing_targets;

/// Default maximum request body size for JSON routes: 1 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Room left for multipart boundaries and the text fields of an upload.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;
