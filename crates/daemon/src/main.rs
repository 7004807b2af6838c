//! JumpQueue Daemon - Main Entry Point
//! Composition root: SQLite adapters + AccessCodeService + JSON-RPC server

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::DaemonConfig;
use jumpqueue_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use jumpqueue_core::application::AccessCodeService;
use jumpqueue_core::port::id_provider::UuidProvider;
use jumpqueue_core::port::time_provider::SystemTimeProvider;
use jumpqueue_infra_sqlite::{
    create_pool_with, run_migrations, PoolSettings, SqliteAccessCodeRepository,
    SqliteQueueRepository, SqliteVisitorInfoSink, SqliteVisitorRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("JUMPQUEUE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("jumpqueue=info"))
        .context("Failed to create env filter")?;

    let registry = tracing_subscriber::registry()
        .with(telemetry::layer::<Registry>())
        .with(env_filter);

    match log_format.as_str() {
        // Production: JSON structured logging
        "json" => registry.with(fmt::layer().json()).try_init()?,
        // Development: Pretty formatting with colors
        _ => registry.with(fmt::layer().pretty()).try_init()?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    init_logging()?;
    info!("JumpQueue daemon v{} starting...", VERSION);
    telemetry::report_status();

    // 2. Load configuration
    let cfg = DaemonConfig::load()?;

    info!(db_path = %cfg.db_path, "Initializing database...");

    // 3. Initialize database
    if let Some(parent) = cfg.db_path().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let pool = create_pool_with(
        &cfg.db_path,
        &PoolSettings {
            max_connections: cfg.max_connections,
            busy_timeout: cfg.busy_timeout(),
        },
    )
    .await
    .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let codes = Arc::new(SqliteAccessCodeRepository::new(pool.clone()));

    // One service instance: it owns the per-lane locks
    let service = Arc::new(AccessCodeService::new(
        Arc::new(SqliteQueueRepository::new(pool.clone())),
        Arc::new(SqliteVisitorRepository::new(pool.clone())),
        codes.clone(),
        codes,
        Arc::new(SqliteVisitorInfoSink::new(pool.clone())),
        id_provider.clone(),
        time_provider.clone(),
    ));

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        host: cfg.rpc_host.clone(),
        port: cfg.rpc_port,
    };
    let handler = Arc::new(RpcHandler::new(service, id_provider, time_provider));
    let (addr, rpc_handle) = RpcServer::new(rpc_config, handler)
        .start()
        .await
        .context("RPC server start failed")?;

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    rpc_handle.stop().context("RPC server stop failed")?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}
