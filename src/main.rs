//! ENS Media Server binary
//!
//! Wires configuration, the two S3-backed stores and the JSON-RPC
//! ownership oracle into the router, then serves until SIGTERM/Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ens_media_server::config::Config;
use ens_media_server::eth::RpcOracle;
use ens_media_server::storage::{s3_client, S3Store};
use ens_media_server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ens_media_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting ENS Media Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("S3 endpoint: {}", config.storage.endpoint);
    tracing::info!(
        "Buckets: avatars={}, headers={}",
        config.storage.avatar_bucket,
        config.storage.header_bucket
    );

    let client = s3_client(&config.storage).await;
    let avatar_store = Arc::new(S3Store::new(client.clone(), &config.storage.avatar_bucket).await);
    let header_store = Arc::new(S3Store::new(client, &config.storage.header_bucket).await);

    let oracle = Arc::new(RpcOracle::new(
        config.rpc.endpoints.clone(),
        config.rpc.localhost_contracts.clone(),
    ));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState::new(config, avatar_store, header_store, oracle);
    let router = app(state);

    tracing::info!("ENS Media Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
