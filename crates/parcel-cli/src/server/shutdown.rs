//! Shutdown signal handling.

use std::time::Duration;

use derive_more::Display;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// The signal that stopped the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ShutdownSignal {
    #[display("SIGINT")]
    Interrupt,
    #[display("SIGTERM")]
    Terminate,
}

/// Resolves once Ctrl+C or SIGTERM is received, then logs the drain window.
pub async fn shutdown_signal(shutdown_timeout: Duration) {
    let signal = tokio::select! {
        () = interrupt() => ShutdownSignal::Interrupt,
        () = terminate() => ShutdownSignal::Terminate,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        %signal,
        drain_secs = shutdown_timeout.as_secs(),
        "shutdown requested, draining in-flight requests"
    );
}

async fn interrupt() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        // Without a handler the process can still be stopped with SIGTERM.
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            %error,
            "cannot listen for Ctrl+C"
        );
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                %error,
                "cannot listen for SIGTERM"
            );
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
    }
}
