//! # Pastebin Binary
//!
//! The entry point that assembles the application from configuration and
//! compile-time store features.

mod logging;

use anyhow::{bail, Context, Result};
use axum::http::HeaderName;
use pb_api::{AppState, HttpSettings};
use pb_configs::{AppConfig, StoreBackend, StoreSettings};
use pb_core::clock::SystemClock;
use pb_core::ids::UuidIdGenerator;
use pb_core::lifecycle::{EngineSettings, PasteEngine};
use pb_core::traits::PasteStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[cfg(feature = "store-memory")]
use pb_store_memory::MemoryPasteStore;

#[cfg(feature = "store-redis")]
use pb_store_redis::RedisPasteStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init(&config.log);
    if let Some(path) = &config.env_file {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let store = build_store(&config.store)?;
    if let Err(err) = store.ping().await {
        tracing::warn!(error = %err, "store is not reachable yet");
    }

    let engine = PasteEngine::new(
        store,
        Arc::new(UuidIdGenerator::new(config.paste.id_length)),
        EngineSettings {
            max_content_bytes: config.paste.max_content_bytes,
            max_update_attempts: config.paste.max_update_attempts,
        },
    );

    let time_override = if config.clock.test_mode {
        let header = HeaderName::try_from(config.clock.header.to_ascii_lowercase())
            .context("clock.header is not a valid header name")?;
        tracing::warn!(header = %header, "test mode: request time overrides are honoured");
        Some(header)
    } else {
        None
    };

    let state = AppState {
        engine,
        clock: Arc::new(SystemClock),
        time_override: time_override.clone(),
        public_base_url: config.server.public_base_url.clone(),
    };

    let http = HttpSettings {
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        body_limit_bytes: config.server.body_limit_bytes,
        allowed_origins: config.cors.allowed_origins.clone(),
        extra_allowed_headers: time_override.iter().cloned().collect(),
    };

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, backend = ?config.store.backend, "pastebin listening");

    axum::serve(listener, pb_api::router(state, &http))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_store(settings: &StoreSettings) -> Result<Arc<dyn PasteStore>> {
    match settings.backend {
        StoreBackend::Memory => memory_store(),
        StoreBackend::Redis => redis_store(settings),
    }
}

#[cfg(feature = "store-memory")]
fn memory_store() -> Result<Arc<dyn PasteStore>> {
    tracing::warn!("using the in-memory store; pastes are lost on restart");
    Ok(Arc::new(MemoryPasteStore::new()))
}

#[cfg(not(feature = "store-memory"))]
fn memory_store() -> Result<Arc<dyn PasteStore>> {
    bail!("store.backend = memory but the binary was built without `store-memory`")
}

#[cfg(feature = "store-redis")]
fn redis_store(settings: &StoreSettings) -> Result<Arc<dyn PasteStore>> {
    use secrecy::ExposeSecret;

    let Some(url) = settings.redis_url.as_ref() else {
        bail!("store.redis_url is required for the redis backend");
    };
    let store = RedisPasteStore::connect(url.expose_secret(), settings.key_prefix.clone())
        .context("failed to create redis pool")?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "store-redis"))]
fn redis_store(_settings: &StoreSettings) -> Result<Arc<dyn PasteStore>> {
    bail!("store.backend = redis but the binary was built without `store-redis`")
}

async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. If the handler could not be installed the
/// server keeps running rather than shutting down at once.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(err) => {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
