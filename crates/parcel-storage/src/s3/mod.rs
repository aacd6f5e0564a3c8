//! S3 compatible backend built on the `minio` client.

use std::fmt;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};
use minio::s3::Client;
use minio::s3::builders::ObjectToDelete;
use minio::s3::creds::StaticProvider;
use minio::s3::error::{Error as MinioError, ErrorCode};
use minio::s3::http::BaseUrl;
use minio::s3::response::DeleteResult;
use minio::s3::types::{S3Api, ToStream};

use crate::{
    ByteStream, DeleteRejected, KeyStream, ObjectStore, StorageBackend, StorageConfig, StorageError,
    StorageResult, StoredObject, TRACING_TARGET_S3,
};

/// Maximum number of keys S3 accepts in one `DeleteObjects` request.
pub const DELETE_BATCH_SIZE: usize = 1000;

/// Error code S3 returns for a missing object.
const NO_SUCH_KEY: &str = "NoSuchKey";

/// Error codes S3 returns when the bucket was created by someone else first.
const BUCKET_ALREADY_CREATED: [&str; 2] = ["BucketAlreadyOwnedByYou", "BucketAlreadyExists"];

/// Object store backed by an S3 compatible service.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl S3Store {
    /// Builds a client from `config` without contacting the service.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let endpoint = config.endpoint()?;
        let (access_key, secret_key) = config.credentials()?;

        let base_url = endpoint
            .parse::<BaseUrl>()
            .map_err(|e| StorageError::Init(format!("invalid endpoint '{endpoint}': {e}")))?;

        let provider = StaticProvider::new(access_key, secret_key, None);
        let client = Client::new(base_url, Some(Box::new(provider)), None, None)
            .map_err(|e| StorageError::Init(e.to_string()))?;

        tracing::info!(
            target: TRACING_TARGET_S3,
            endpoint = %endpoint,
            bucket = %config.bucket(),
            "object storage client created"
        );

        Ok(Self {
            client,
            bucket: config.bucket().to_owned(),
            endpoint,
        })
    }

    /// Returns the bucket every object is stored in.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl fmt::Debug for S3Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Store")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    fn backend(&self) -> StorageBackend {
        StorageBackend::S3
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_S3)]
    async fn ensure_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        if self.bucket_exists(bucket).await? {
            tracing::debug!(target: TRACING_TARGET_S3, bucket, "bucket already exists");
            return Ok(());
        }

        let created = self
            .client
            .create_bucket(bucket)
            .region(Some(region.to_owned()))
            .send()
            .await;

        match created {
            Ok(_) => {
                tracing::info!(target: TRACING_TARGET_S3, bucket, region, "bucket created");
            }
            // Another instance won the race between the check and the create.
            Err(MinioError::S3Error(error))
                if BUCKET_ALREADY_CREATED
                    .iter()
                    .any(|code| error.code == ErrorCode::parse(code)) =>
            {
                tracing::debug!(
                    target: TRACING_TARGET_S3,
                    bucket,
                    code = ?error.code,
                    "bucket created concurrently"
                );
            }
            Err(e) => return Err(StorageError::bucket(bucket, e)),
        }

        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        let response = self
            .client
            .bucket_exists(bucket)
            .send()
            .await
            .map_err(|e| StorageError::bucket(bucket, e))?;

        Ok(response.exists)
    }

    #[tracing::instrument(skip(self, body), target = TRACING_TARGET_S3, fields(size = body.len()))]
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object_content(&self.bucket, key, body)
            .content_type(content_type.to_owned())
            .send()
            .await
            .map_err(|e| StorageError::write(key, e))?;

        Ok(())
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_S3)]
    async fn get_object(&self, key: &str) -> StorageResult<Option<StoredObject>> {
        let response = match self.client.get_object(&self.bucket, key).send().await {
            Ok(response) => response,
            Err(MinioError::S3Error(error)) if error.code == ErrorCode::parse(NO_SUCH_KEY) => return Ok(None),
            Err(e) => return Err(StorageError::read(key, e)),
        };

        let content_type = response
            .headers
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_owned();
        let size = response.object_size;

        let (stream, _) = response
            .content
            .to_stream()
            .await
            .map_err(|e| StorageError::read(key, e))?;

        let owned_key = key.to_owned();
        let body: ByteStream =
            Box::pin(stream.map_err(move |e| StorageError::read(&owned_key, e)));

        Ok(Some(StoredObject {
            body,
            size,
            content_type,
        }))
    }

    fn list_objects(&self, prefix: &str) -> KeyStream {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let prefix = prefix.to_owned();

        let pages = stream::once(async move {
            let pages = client
                .list_objects(&bucket)
                .recursive(true)
                .prefix(Some(prefix.clone()))
                .to_stream()
                .await;

            pages.map(move |page| match page {
                Ok(page) => {
                    let keys: Vec<_> = page.contents.into_iter().map(|entry| Ok(entry.name)).collect();
                    stream::iter(keys)
                }
                Err(e) => stream::iter(vec![Err(StorageError::list(&prefix, e))]),
            })
        });

        Box::pin(pages.flatten().flatten())
    }

    #[tracing::instrument(skip(self, keys), target = TRACING_TARGET_S3, fields(count = keys.len()))]
    async fn delete_objects(&self, keys: Vec<String>) -> StorageResult<()> {
        for batch in keys.chunks(DELETE_BATCH_SIZE) {
            let objects: Vec<ObjectToDelete> = batch
                .iter()
                .map(|key| ObjectToDelete::from(key.as_str()))
                .collect();

            let response = self
                .client
                .delete_objects::<&str, ObjectToDelete>(&self.bucket, objects)
                .send()
                .await
                .map_err(|e| StorageError::delete(batch.len(), e))?;

            // Refused keys come back inside a successful response.
            let mut rejected = response.result.into_iter().filter_map(rejected_delete);
            if let Some(first) = rejected.next() {
                let count = 1 + rejected.count();
                tracing::error!(
                    target: TRACING_TARGET_S3,
                    count,
                    key = %first.key,
                    code = %first.code,
                    "objects were not deleted"
                );
                return Err(StorageError::delete(count, first));
            }

            tracing::debug!(
                target: TRACING_TARGET_S3,
                count = batch.len(),
                "object batch deleted"
            );
        }

        Ok(())
    }
}

fn rejected_delete(result: DeleteResult) -> Option<DeleteRejected> {
    match result {
        DeleteResult::Deleted(_) => None,
        DeleteResult::Error(error) => Some(DeleteRejected {
            key: error.object_name,
            code: error.code,
            message: error.message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{Method, StatusCode, Uri, header};
    use tokio::net::TcpListener;

    use super::*;

    const LOCATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<LocationConstraint xmlns="http://s3.amazonaws.com/doc/2006-03-01/">us-east-1</LocationConstraint>"#;

    const PARTIAL_DELETE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DeleteResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Deleted><Key>acme/1.0.0/a.txt</Key></Deleted><Error><Key>acme/1.0.0/b.txt</Key><Code>AccessDenied</Code><Message>Access Denied</Message></Error></DeleteResult>"#;

    const FULL_DELETE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DeleteResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Deleted><Key>acme/1.0.0/a.txt</Key></Deleted><Deleted><Key>acme/1.0.0/b.txt</Key></Deleted></DeleteResult>"#;

    const BUCKET_OWNED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>BucketAlreadyOwnedByYou</Code><Message>Your previous request to create the named bucket succeeded and you already own it.</Message><BucketName>parcel</BucketName><Resource>/parcel</Resource><RequestId>1</RequestId><HostId>1</HostId></Error>"#;

    type Reply = fn(&Method) -> (StatusCode, &'static str);

    /// Serves canned S3 answers on a local port and returns a store bound to it.
    async fn local_s3(reply: Reply) -> anyhow::Result<S3Store> {
        let app = Router::new().fallback(move |method: Method, uri: Uri| async move {
            let (status, body) = if uri.query().is_some_and(|q| q.starts_with("location")) {
                (StatusCode::OK, LOCATION)
            } else {
                reply(&method)
            };
            (status, [(header::CONTENT_TYPE, "application/xml")], body)
        });

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, app).await });

        let config = StorageConfig {
            s3_url: Some(addr.to_string()),
            s3_key: Some("access".into()),
            s3_secret: Some("secret".into()),
            s3_ssl: false,
            ..StorageConfig::default()
        };
        Ok(S3Store::new(&config)?)
    }

    fn keys() -> Vec<String> {
        vec!["acme/1.0.0/a.txt".into(), "acme/1.0.0/b.txt".into()]
    }

    #[test]
    fn test_build_without_connecting() -> anyhow::Result<()> {
        let config = StorageConfig {
            s3_url: Some("localhost:9000".into()),
            s3_key: Some("access".into()),
            s3_secret: Some("secret".into()),
            s3_ssl: false,
            ..StorageConfig::default()
        };

        let store = S3Store::new(&config)?;
        assert_eq!(store.bucket(), "parcel");
        assert_eq!(store.backend(), StorageBackend::S3);
        Ok(())
    }

    #[test]
    fn test_reject_missing_credentials() {
        let config = StorageConfig {
            s3_url: Some("localhost:9000".into()),
            ..StorageConfig::default()
        };
        assert!(matches!(
            S3Store::new(&config),
            Err(StorageError::Init(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_refused_keys_fail_the_delete() -> anyhow::Result<()> {
        let store = local_s3(|_| (StatusCode::OK, PARTIAL_DELETE)).await?;

        let result = store.delete_objects(keys()).await;
        let Err(StorageError::Delete { count, source }) = result else {
            anyhow::bail!("expected a delete error, got {result:?}");
        };

        assert_eq!(count, 1);
        let source = source.to_string();
        assert!(source.contains("acme/1.0.0/b.txt"), "{source}");
        assert!(source.contains("AccessDenied"), "{source}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_confirmed_delete_succeeds() -> anyhow::Result<()> {
        let store = local_s3(|_| (StatusCode::OK, FULL_DELETE)).await?;
        store.delete_objects(keys()).await?;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bucket_created_concurrently() -> anyhow::Result<()> {
        let store = local_s3(|method| {
            if method == &Method::HEAD {
                (StatusCode::NOT_FOUND, "")
            } else {
                (StatusCode::CONFLICT, BUCKET_OWNED)
            }
        })
        .await?;

        store.ensure_bucket("parcel", "us-east-1").await?;
        Ok(())
    }
}
