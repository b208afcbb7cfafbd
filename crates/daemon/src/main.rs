//! blasterctl daemon - Main Entry Point
//! Wires the filesystem repository, the metrics collector and the JSON-RPC server.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use prometheus::Registry;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blasterctl_api_rpc::{RpcServer, RpcServerConfig};
use blasterctl_core::port::InstanceRepository;
use blasterctl_infra_system::{FsInstanceRepository, SystemHostProbe};
use blasterctl_metrics::InstanceCollector;

use config::{Config, LogFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(config: &Config) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_filter()))
        .context("Failed to create env filter")?;

    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init(),
    }
    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    let mut terminate = signal(SignalKind::terminate()).context("SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("SIGINT handler")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = Config::parse();
    init_logging(&config)?;
    info!("blasterctld v{} starting...", VERSION);

    // 2. Repository
    let repository_config = config.repository();
    let repository = Arc::new(FsInstanceRepository::new(
        repository_config,
        tracing::info_span!("repository"),
    ));
    info!(
        directory = %repository.config_folder().display(),
        executable = %repository.executable().display(),
        instances = repository.instances().len(),
        "Instance repository ready"
    );
    let repository: Arc<dyn InstanceRepository> = repository;

    // 3. Metrics
    let registry = Registry::new();
    InstanceCollector::new(
        Arc::clone(&repository),
        tokio::runtime::Handle::current(),
        tracing::info_span!("metrics"),
    )
    .context("Metrics collector setup failed")?
    .register(&registry)
    .context("Metrics collector registration failed")?;

    // 4. JSON-RPC server
    let rpc_config = RpcServerConfig {
        addr: config.addr.clone(),
    };
    let host = Arc::new(SystemHostProbe::new(tracing::info_span!("host")));
    let rpc_server = RpcServer::new(
        rpc_config,
        repository,
        host,
        registry,
        tracing::info_span!("rpc"),
    );
    let (addr, rpc_handle) = rpc_server
        .start()
        .await
        .context("RPC server start failed")?;

    info!(%addr, "System ready");

    // 5. Wait for shutdown signal; instances keep running
    shutdown_signal().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");
    Ok(())
}
