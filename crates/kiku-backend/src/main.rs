use std::sync::Arc;

use clap::Parser;
use tokio::signal;

use kiku::errors::Report;
use kiku::log;
use kiku_backend::{AppState, config::Config, routes};

#[tokio::main]
async fn main() -> Result<(), Report> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Setup logging
    kiku::log::setup()?;

    let config = Config::parse();
    log::debug!("Configuration: {:?}", config);

    // Setup the store and routes
    let store = config.open_store().await?;
    log::info!("Using {} session storage", store.backend());
    let state = Arc::new(AppState::new(store, config.secure_cookies));
    let app = routes::setup_routes(state, config.cors_origins()?);

    // Setup the server
    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    log::info!("Starting server on http://{}", listener.local_addr()?);
    log::info!("Press Ctrl+C to stop the server");

    // Start the server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Shutting down server");

    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM)
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Signal received, starting graceful shutdown");
}
