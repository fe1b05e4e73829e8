pub mod analyses; // Analysis history views
pub mod api; // REST surface under /api
pub mod auth; // Session exchange + bearer gate
pub mod config;
pub mod core_state; // Shared state: store + outbound clients
pub mod db;
pub mod models;
pub mod patients; // Owner-scoped patient registry
pub mod pipeline; // Upload → classify → report → persist

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Startup and shutdown failures surfaced by [`run`].
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("State initialization failed: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("Server error: {0}")]
    Server(#[from] api::ServerError),
    #[error("Signal handler error: {0}")]
    Signal(#[from] std::io::Error),
}

/// Run the backend until Ctrl-C, then drain in-flight requests and close
/// the store.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = config::AppConfig::from_env()?;
    tracing::debug!(config = ?app_config, "Configuration loaded");

    let core = Arc::new(core_state::CoreState::from_config(app_config)?);
    let mut server = api::start_server(core.clone()).await?;
    tracing::info!(addr = %server.addr, "Listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    server.shutdown();
    server.stopped().await;
    core.shutdown()?;

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
