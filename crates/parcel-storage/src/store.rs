//! The gateway trait every backend implements.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;

use crate::memory::MemoryStore;
use crate::s3::S3Store;
use crate::{StorageBackend, StorageConfig, StorageResult};

/// Object body delivered chunk by chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Lazily produced object keys.
pub type KeyStream = Pin<Box<dyn Stream<Item = StorageResult<String>> + Send>>;

/// A stored object opened for reading.
pub struct StoredObject {
    /// Object content.
    pub body: ByteStream,
    /// Content length in bytes.
    pub size: u64,
    /// Media type recorded at upload time.
    pub content_type: String,
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Remote object storage operations.
///
/// Every call may fail with a transport error. Writes overwrite, so the last
/// writer wins; nothing here is transactional.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Returns which backend this is.
    fn backend(&self) -> StorageBackend;

    /// Creates the bucket when it does not exist yet.
    async fn ensure_bucket(&self, bucket: &str, region: &str) -> StorageResult<()>;

    /// Reports whether the bucket exists.
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Stores `body` under `key`, replacing any previous object.
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()>;

    /// Opens the object at `key`, or returns `None` when there is none.
    async fn get_object(&self, key: &str) -> StorageResult<Option<StoredObject>>;

    /// Streams every key that starts with `prefix`.
    ///
    /// The stream is finite and restartable by calling this method again.
    fn list_objects(&self, prefix: &str) -> KeyStream;

    /// Deletes `keys` in bulk. Not atomic; an empty batch is a no-op.
    async fn delete_objects(&self, keys: Vec<String>) -> StorageResult<()>;
}

/// Builds the backend selected by `config`.
pub fn connect(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate()?;

    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::S3 => Arc::new(S3Store::new(config)?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    Ok(store)
}
