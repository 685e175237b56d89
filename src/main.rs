// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use bluestake_server::{
    api::router,
    blockchain::{ChainTiming, Deployment, RpcChainReader, BASE_MAINNET},
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    reconcile::{FeedRegistry, Reconciler, SnapshotPoller},
    state::AppState,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server exited with error");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let reader = RpcChainReader::new(BASE_MAINNET, &config.rpc_url)?
        .with_max_block_range(config.log_block_range);
    info!(
        network = reader.network().name,
        chain_id = reader.network().chain_id,
        rpc_url = %config.rpc_url,
        "Chain reader configured"
    );

    let reconciler = Reconciler::new(
        Arc::new(reader),
        Deployment::base_mainnet(),
        ChainTiming::default(),
        &config.explorer_url,
    );
    let feeds = Arc::new(FeedRegistry::new(
        reconciler,
        config.failure_policy,
        config.feed_capacity,
    ));
    let state = AppState::new(BASE_MAINNET, feeds.clone());

    let shutdown = CancellationToken::new();
    let poller = match config.poll_interval {
        Some(interval) => Some(tokio::spawn(
            SnapshotPoller::new(feeds, interval)
                .with_max_concurrent(config.poll_concurrency)
                .run(shutdown.clone()),
        )),
        None => {
            info!("Background refresh disabled");
            None
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        "Bluestake server listening (docs at /docs)"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Some(poller) = poller {
        if let Err(e) = poller.await {
            error!(error = %e, "Snapshot poller task failed");
        }
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
