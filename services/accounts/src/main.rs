use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod extract;
mod keys;
mod models;
mod password;
mod repositories;
mod routes;
mod state;
mod store;
mod validation;

use common::cache::RedisPool;
use tokio::net::TcpListener;

use crate::{
    config::ServiceConfig, password::PasswordHasher, repositories::AccountRepository,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting account service");

    let config = ServiceConfig::from_env()?;

    // The store connection is opened by the first request that needs it
    let redis_pool = Arc::new(RedisPool::new(&config.redis)?);
    let hasher = PasswordHasher::new(config.hash_cost)?;

    let app_state = AppState {
        accounts: AccountRepository::new(redis_pool, hasher),
    };

    let app = routes::create_router(app_state.clone());

    let listener = TcpListener::bind(&config.listen_address).await?;
    info!("Account service listening on {}", config.listen_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing store connection");
    if let Err(e) = app_state.accounts.dispose().await {
        error!("Failed to close store connection: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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
