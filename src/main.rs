// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::error::Error;
use std::sync::Arc;

use privatedb_server::{
    api::router,
    auth::NonceSweeper,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    db::{Catalog, PgCatalog, PgPoolFactory},
    state::AppState,
};
use sqlx::postgres::PgConnectOptions;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    init_tracing(config.log_format);

    let connect_options: PgConnectOptions = config.database_url.parse()?;
    let catalog = Arc::new(PgCatalog::connect_lazy(
        connect_options.clone(),
        config.admin_pool_max_connections,
    ));
    let factory = Arc::new(
        PgPoolFactory::new(connect_options, config.tenant_pool_max_connections)
            .with_statement_timeout(config.statement_timeout),
    );

    info!(database_url = %config.redacted_database_url(), "Using administrative connection");
    if let Err(e) = catalog.ping().await {
        warn!(error = %e, "Administrative connection not reachable yet");
    }

    let state = AppState::new(&config.auth(), catalog.clone(), factory);

    let shutdown = CancellationToken::new();
    let sweeper = NonceSweeper::new(state.challenges.clone())
        .with_interval(config.nonce_sweep_interval);
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown.clone()));

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, app_name = %config.app_name, "PrivateDB listening (docs at /docs)");

    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper_handle.await {
        warn!(error = %e, "Nonce sweeper task ended abnormally");
    }
    state.pools.close_all().await;
    catalog.close().await;
    info!("Shutdown complete");

    Ok(())
}
