//! Uptime and exit logging around the serve future.

use std::future::Future;
use std::io;
use std::time::Instant;

use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Runs the future returned by `serve_fn` and reports how the server exited.
///
/// # Errors
///
/// Returns a [`ServerError::Runtime`] when the server future fails.
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            host = %server_config.host,
            "listening on every interface, uploads are only guarded by tokens"
        );
    }

    let started_at = Instant::now();
    let result = serve_fn().await;
    let uptime_secs = started_at.elapsed().as_secs();

    let Err(source) = result else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs,
            "server stopped"
        );
        return Ok(());
    };

    let error = ServerError::Runtime(source);
    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        %error,
        uptime_secs,
        suggestion = error.suggestion(),
        "server exited with an error"
    );

    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clean_exit() -> anyhow::Result<()> {
        let config = ServerConfig::default();
        serve_with_shutdown(&config, || async { Ok(()) }).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_io_failure_becomes_runtime_error() {
        let config = ServerConfig::default();
        let result =
            serve_with_shutdown(&config, || async { Err(io::Error::other("listener closed")) })
                .await;

        assert!(matches!(result, Err(ServerError::Runtime(_))));
    }
}
