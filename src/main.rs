// src/main.rs
mod acts;
mod auth;
mod config;
mod db;
mod error;
mod events;
mod handlers;
mod models;
mod poll;
mod rooms;
mod routes;
mod state;
mod tally;

use std::net::SocketAddr;
use std::time::Duration;

use axum_server::Handle;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok(); // Load environment variables from .env file

    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load();
    let port = config.port;

    // Create the database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to the database");

    let state = AppState::new(pool, config);
    let app = routes::create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {addr}");

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .expect("Server error");
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
