#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use parcel_server::handler::routes;
use parcel_server::middleware::{
    RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt, SecurityHeadersConfig,
};
use parcel_server::service::{ServiceConfig, ServiceState};
use parcel_storage::ObjectStore;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "parcel_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "parcel_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "parcel_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let store = connect_storage(&cli.service).await?;
    let state = ServiceState::new(&cli.service, store);
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;
    Ok(())
}

/// Connects the configured backend and makes sure the bucket exists.
async fn connect_storage(config: &ServiceConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let storage = &config.storage;
    let store = parcel_storage::connect(storage)
        .context("error while creating object storage client")?;

    store
        .ensure_bucket(storage.bucket(), storage.location())
        .await
        .with_context(|| format!("failed to prepare bucket '{}'", storage.bucket()))?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        backend = %store.backend(),
        bucket = storage.bucket(),
        "object storage ready"
    );

    Ok(store)
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, security headers, compression
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(state.clone())
        .with_state(state)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}
