//! In-process backend for development and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use futures::stream;
use tokio::sync::RwLock;

use crate::{
    ByteStream, KeyStream, ObjectStore, StorageBackend, StorageResult, StoredObject,
    TRACING_TARGET_MEMORY,
};

#[derive(Debug, Clone)]
struct MemoryObject {
    content: Bytes,
    content_type: String,
}

#[derive(Debug, Default)]
struct Inner {
    buckets: RwLock<BTreeSet<String>>,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    operations: AtomicUsize,
}

/// Object store kept in process memory.
///
/// Cloning is cheap and clones share the same contents. Every gateway call
/// increments [`operation_count`](Self::operation_count).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many gateway calls this store has served.
    pub fn operation_count(&self) -> usize {
        self.inner.operations.load(Ordering::SeqCst)
    }

    /// Returns how many objects are stored.
    pub async fn len(&self) -> usize {
        self.inner.objects.read().await.len()
    }

    /// Returns `true` when no object is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn record(&self) {
        self.inner.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn ensure_bucket(&self, bucket: &str, _region: &str) -> StorageResult<()> {
        self.record();
        if self.inner.buckets.write().await.insert(bucket.to_owned()) {
            tracing::debug!(target: TRACING_TARGET_MEMORY, bucket, "bucket created");
        }
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        self.record();
        Ok(self.inner.buckets.read().await.contains(bucket))
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()> {
        self.record();
        let object = MemoryObject {
            content: body,
            content_type: content_type.to_owned(),
        };
        self.inner.objects.write().await.insert(key.to_owned(), object);
        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<Option<StoredObject>> {
        self.record();
        let Some(object) = self.inner.objects.read().await.get(key).cloned() else {
            return Ok(None);
        };

        let size = object.content.len() as u64;
        let body: ByteStream = Box::pin(stream::once(async move { Ok(object.content) }));

        Ok(Some(StoredObject {
            body,
            size,
            content_type: object.content_type,
        }))
    }

    fn list_objects(&self, prefix: &str) -> KeyStream {
        self.record();
        let inner = Arc::clone(&self.inner);
        let prefix = prefix.to_owned();

        let keys = stream::once(async move {
            let objects = inner.objects.read().await;
            let keys: Vec<StorageResult<String>> = objects
                .range(prefix.clone()..)
                .map(|(key, _)| key)
                .take_while(|key| key.starts_with(&prefix))
                .map(|key| Ok(key.clone()))
                .collect();
            stream::iter(keys)
        });

        Box::pin(futures::StreamExt::flatten(keys))
    }

    async fn delete_objects(&self, keys: Vec<String>) -> StorageResult<()> {
        self.record();
        let mut objects = self.inner.objects.write().await;
        for key in &keys {
            objects.remove(key);
        }

        tracing::debug!(target: TRACING_TARGET_MEMORY, count = keys.len(), "objects deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures::{StreamExt, TryStreamExt};

    use super::*;

    async fn read_all(object: StoredObject) -> anyhow::Result<Vec<u8>> {
        let chunks: Vec<Bytes> = object.body.try_collect().await?;
        Ok(chunks.concat())
    }

    #[tokio::test]
    async fn test_put_then_get() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store
            .put_object("acme/1.0.0/index.js", Bytes::from_static(b"1"), "text/javascript")
            .await?;

        let object = store
            .get_object("acme/1.0.0/index.js")
            .await?
            .ok_or_else(|| anyhow::anyhow!("object missing"))?;
        assert_eq!(object.size, 1);
        assert_eq!(object.content_type, "text/javascript");
        assert_eq!(read_all(object).await?, b"1");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_object_is_none() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        assert!(store.get_object("nope").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_respects_prefix() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        for key in ["a/1/x", "a/1/y/z", "a/10/x", "b/1/x"] {
            store.put_object(key, Bytes::new(), "text/plain").await?;
        }

        let keys: Vec<String> = store.list_objects("a/1/").try_collect().await?;
        assert_eq!(keys, vec!["a/1/x", "a/1/y/z"]);

        let keys: Vec<String> = store.list_objects("c/").try_collect().await?;
        assert!(keys.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_restartable() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.put_object("a/1/x", Bytes::new(), "text/plain").await?;

        assert_eq!(store.list_objects("a/").count().await, 1);
        assert_eq!(store.list_objects("a/").count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.put_object("a/1/x", Bytes::new(), "text/plain").await?;

        store.delete_objects(vec!["a/1/x".into()]).await?;
        store.delete_objects(vec!["a/1/x".into()]).await?;
        store.delete_objects(Vec::new()).await?;
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_bucket_is_idempotent() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        assert!(!store.bucket_exists("parcel").await?);

        store.ensure_bucket("parcel", "us-east-1").await?;
        store.ensure_bucket("parcel", "us-east-1").await?;
        assert!(store.bucket_exists("parcel").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_counts_operations() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let shared = store.clone();
        assert_eq!(store.operation_count(), 0);

        shared.put_object("k", Bytes::new(), "text/plain").await?;
        let _ = shared.get_object("k").await?;
        let _ = shared.list_objects("").count().await;
        assert_eq!(store.operation_count(), 3);
        Ok(())
    }
}
