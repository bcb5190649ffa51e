//! Wallpaper Server - HTTP API over the wallpaper image set
//!
//! - GET /api/images - ordered image list
//! - GET /api/images/latest - last image of the ordered list
//! - GET /api/images/position/{n} - image at a position
//!
//! Every image endpoint accepts `format=image` to redirect to the image.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wallpaper_core::{RedisImageStore, StoreConfig};
use wallpaper_server::{create_router_with_config, AppState, Config};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wallpaper_server=debug,wallpaper_core=debug")),
        )
        .with_target(true)
        .init();

    let config = Config::from_env();

    let store_config = match StoreConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid image store configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(store = ?store_config, "Image store configured");

    let store = match RedisImageStore::new(&store_config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create image store client");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::with_config(Arc::new(store), &config);
    let app = create_router_with_config(state, &config);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%addr, "Wallpaper server listening");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
