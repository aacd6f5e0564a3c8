//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use parcel_server::handler::routes;
//! use parcel_server::service::{ServiceConfig, ServiceState};
//! use parcel_storage::memory::MemoryStore;
//!
//! # fn example(config: ServiceConfig) {
//! let state = ServiceState::new(&config, Arc::new(MemoryStore::new()));
//! let router: axum::Router = routes(state.clone()).with_state(state);
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod cdn;
mod error;
mod monitors;
mod packages;
mod request;
mod response;
mod tokens;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::CreateToken;
pub use crate::handler::response::{
    HealthStatus, PackageCreated, PackageFiles, ServiceInfo, TokenCreated,
};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all private routes.
fn private_routes(state: &ServiceState) -> Router<ServiceState> {
    packages::routes(state)
}

/// Returns a [`Router`] with all public routes.
fn public_routes() -> Router<ServiceState> {
    Router::new()
        .merge(monitors::routes())
        .merge(cdn::routes())
        .merge(tokens::routes())
}

/// Returns a [`Router`] with all routes.
///
/// Private routes require a bearer token; unmatched paths answer with a
/// JSON `not_found` body.
pub fn routes(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .merge(private_routes(&state))
        .merge(public_routes())
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::io::{self, Cursor, Write};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum_test::TestServer;
    use bytes::Bytes;
    use futures::stream;
    use parcel_core::BoxedError;
    use parcel_storage::memory::MemoryStore;
    use parcel_storage::{
        KeyStream, ObjectStore, StorageBackend, StorageConfig, StorageError, StorageResult,
        StoredObject,
    };
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use crate::handler::routes;
    use crate::service::{AuthConfig, ServiceConfig, ServiceState};

    pub const TEST_ADMIN_USER: &str = "admin";
    pub const TEST_ADMIN_PASSWORD: &str = "password";

    /// Returns a valid configuration backed by the in-memory store.
    pub fn test_config() -> ServiceConfig {
        ServiceConfig {
            storage: StorageConfig::memory(),
            auth: AuthConfig {
                secret: "test-secret".into(),
                admin_user: TEST_ADMIN_USER.into(),
                admin_password: TEST_ADMIN_PASSWORD.into(),
            },
            ..ServiceConfig::default()
        }
    }

    /// Returns a state over a fresh [`MemoryStore`] whose bucket exists.
    pub async fn test_state() -> anyhow::Result<(ServiceState, MemoryStore)> {
        let config = test_config();
        let store = MemoryStore::new();
        store
            .ensure_bucket(config.storage.bucket(), config.storage.location())
            .await?;

        let state = ServiceState::new(&config, Arc::new(store.clone()));
        Ok((state, store))
    }

    /// Issues a token accepted by `state`.
    pub fn bearer_token(state: &ServiceState) -> anyhow::Result<String> {
        Ok(state.tokens.issue("tests", None)?.token)
    }

    /// Builds a zip archive in memory.
    pub fn build_zip(files: &[(&str, &str)]) -> anyhow::Result<Bytes> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            writer.start_file(*name, SimpleFileOptions::default())?;
            writer.write_all(content.as_bytes())?;
        }
        Ok(Bytes::from(writer.finish()?.into_inner()))
    }

    /// [`MemoryStore`] wrapper that fails chosen gateway calls.
    ///
    /// `fail_put_at` is 1-based and fails only that call; listing and
    /// deleting fail every time when their flag is set.
    #[derive(Clone, Default)]
    pub struct FailingStore {
        pub inner: MemoryStore,
        pub fail_put_at: Option<usize>,
        pub fail_list: bool,
        pub fail_delete: bool,
        pub puts: Arc<AtomicUsize>,
    }

    impl FailingStore {
        fn injected() -> BoxedError {
            Box::new(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for FailingStore {
        fn backend(&self) -> StorageBackend {
            self.inner.backend()
        }

        async fn ensure_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
            self.inner.ensure_bucket(bucket, region).await
        }

        async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
            self.inner.bucket_exists(bucket).await
        }

        async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()> {
            let call = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_put_at == Some(call) {
                return Err(StorageError::Write {
                    key: key.to_owned(),
                    source: Self::injected(),
                });
            }
            self.inner.put_object(key, body, content_type).await
        }

        async fn get_object(&self, key: &str) -> StorageResult<Option<StoredObject>> {
            self.inner.get_object(key).await
        }

        fn list_objects(&self, prefix: &str) -> KeyStream {
            if self.fail_list {
                let error = StorageError::List {
                    prefix: prefix.to_owned(),
                    source: Self::injected(),
                };
                return Box::pin(stream::iter([Err::<String, _>(error)]));
            }
            self.inner.list_objects(prefix)
        }

        async fn delete_objects(&self, keys: Vec<String>) -> StorageResult<()> {
            if self.fail_delete {
                return Err(StorageError::Delete {
                    count: keys.len(),
                    source: Self::injected(),
                });
            }
            self.inner.delete_objects(keys).await
        }
    }

    /// Returns a state over `store`.
    pub fn failing_state(store: FailingStore) -> ServiceState {
        ServiceState::new(&test_config(), Arc::new(store))
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: Router<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router.with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with every route.
    pub async fn create_test_server() -> anyhow::Result<(TestServer, ServiceState, MemoryStore)> {
        let (state, store) = test_state().await?;
        let server = create_test_server_with_state(routes(state.clone()), state.clone())?;
        Ok((server, state, store))
    }

    #[tokio::test]
    async fn test_handlers() -> anyhow::Result<()> {
        let (server, _, _) = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() -> anyhow::Result<()> {
        let (server, _, _) = create_test_server().await?;

        let response = server.get("/nowhere").expect_failure().await;
        response.assert_status_not_found();
        assert_eq!(response.json::<serde_json::Value>()["name"], "not_found");
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_outage_is_service_unavailable() -> anyhow::Result<()> {
        let state = failing_state(FailingStore {
            fail_list: true,
            fail_delete: true,
            ..FailingStore::default()
        });
        let token = bearer_token(&state)?;
        let server = create_test_server_with_state(routes(state.clone()), state)?;

        let response = server.get("/cdn/acme@1.0.0").expect_failure().await;
        response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.json::<serde_json::Value>()["name"],
            "storage_unavailable"
        );

        let response = server
            .delete("/packages/acme@1.0.0")
            .authorization_bearer(&token)
            .expect_failure()
            .await;
        response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
        Ok(())
    }

    #[tokio::test]
    async fn test_package_lifecycle() -> anyhow::Result<()> {
        use axum::http::StatusCode;
        use axum_test::multipart::{MultipartForm, Part};

        let (server, state, _) = create_test_server().await?;
        let token = bearer_token(&state)?;
        let archive = build_zip(&[("dist/app.js", "console.log(1)"), ("package.json", "{}")])?;

        let form = MultipartForm::new()
            .add_text("name", "acme")
            .add_text("version", "2.1.0")
            .add_part("file", Part::bytes(archive.to_vec()).file_name("acme.zip"));
        server
            .post("/packages")
            .authorization_bearer(&token)
            .multipart(form)
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get("/cdn/acme@2.1.0/dist/app.js").await;
        response.assert_status_ok();
        response.assert_text("console.log(1)");

        server
            .delete("/packages/acme@2.1.0")
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get("/cdn/acme@2.1.0")
            .expect_failure()
            .await
            .assert_status_not_found();
        Ok(())
    }
}
