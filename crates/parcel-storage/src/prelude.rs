//! Prelude module for convenient imports.

pub use crate::memory::MemoryStore;
pub use crate::s3::S3Store;
pub use crate::{
    ByteStream, KeyStream, ObjectStore, StorageBackend, StorageConfig, StorageError,
    StorageResult, StoredObject,
};
