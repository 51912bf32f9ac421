mod app;
mod error;
mod handlers;
mod models;
mod session;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::{EnvFilter, prelude::*};

use models::app_config::Cli;
use models::{AppConfig, AppState};

const DEFAULT_LOG_FILTER: &str = "soundcloud_stream_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let app_config = AppConfig::from_cli(cli)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    tracing::info!(
        app_url = %app_config.app_url,
        redirect_url = %app_config.redirect_url,
        fixed_state = app_config.callback_token.is_some(),
        "Configuration loaded"
    );

    let app_state = AppState::new(app_config)?;
    let app = app::router(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
