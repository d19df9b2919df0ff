//! Shift engine HTTP server.
//!
//! Usage: `shift-engine [CONFIG_DIR]`. The configuration directory defaults
//! to `$SHIFT_ENGINE_CONFIG`, then `./config/default`.

use std::env;

use shift_engine::api::{AppState, create_router};
use shift_engine::config::ConfigLoader;
use shift_engine::logging;
use shift_engine::scheduling::EscalationScheduler;
use tokio::net::TcpListener;
use tracing::{error, info};

const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = env::args()
        .nth(1)
        .or_else(|| env::var("SHIFT_ENGINE_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string());

    let loader = ConfigLoader::load(&config_dir)?;
    let settings = loader.settings().clone();
    logging::init(&settings.log_filter);

    info!(
        config_dir = %config_dir,
        pharmacies = loader.config().pharmacies().len(),
        "Configuration loaded"
    );

    let state = AppState::from_config(&loader);
    let mut scheduler =
        EscalationScheduler::new(state.service().clone(), settings.sweep_interval());
    scheduler.start()?;

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!(address = %settings.bind_address, "Listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    scheduler.stop().await?;
    info!("Shut down");
    Ok(())
}
