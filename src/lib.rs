pub mod api; // Intake form, day view, record search
pub mod config;
pub mod core_state;
pub mod db; // Records file (CSV)
pub mod intake;
pub mod models;
pub mod query;
pub mod reminder; // Two-hour appointment reminders
pub mod store;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::core_state::{CoreError, CoreState};
use crate::reminder::{LogSink, ReminderScheduler};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to load appointment records: {0}")]
    Records(#[from] CoreError),
    #[error("Failed to start HTTP server: {0}")]
    Server(String),
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

/// Load records, serve the front desk and run reminders until Ctrl+C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // A load failure aborts startup; never serve from a partial store.
    let core = Arc::new(CoreState::open(config::records_path())?);

    let server = api::start_api_server(core.clone(), config::bind_addr())
        .await
        .map_err(StartupError::Server)?;

    let reminders = ReminderScheduler::new(core.shared_store(), Arc::new(LogSink)).start();

    let records = core.store().len().map_err(CoreError::from)?;
    tracing::info!(addr = %server.addr, records, "Front desk ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    server.stopped().await;
    reminders.stopped().await;

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
