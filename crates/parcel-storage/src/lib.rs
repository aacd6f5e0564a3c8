#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the S3 compatible backend.
pub const TRACING_TARGET_S3: &str = "parcel_storage::s3";

/// Tracing target for the in-memory backend.
pub const TRACING_TARGET_MEMORY: &str = "parcel_storage::memory";

mod config;
mod error;
mod store;

pub mod memory;
pub mod s3;

#[doc(hidden)]
pub mod prelude;

pub use crate::config::{StorageBackend, StorageConfig};
pub use crate::error::{DeleteRejected, StorageError, StorageResult};
pub use crate::store::{ByteStream, KeyStream, ObjectStore, StoredObject, connect};
