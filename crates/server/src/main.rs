mod api;
mod bootstrap;
mod error;
mod health;

use std::time::Duration;

use agroprice_core::config::{AppConfig, LoadOptions};
use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn init_logging(config: &AppConfig) {
    use agroprice_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    // Config is loaded once so logging is live before bootstrap runs.
    let app = bootstrap::bootstrap_with_config(config)?;
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = TcpListener::bind(&address).await?;
    let router = api::router(app.state.clone(), app.config.server.cors_allow_any_origin);

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "agroprice-server listening"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined??;
            return Ok(());
        }
        signal = wait_for_shutdown() => signal?,
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = app.config.server.graceful_shutdown_secs,
        "agroprice-server stopping"
    );
    let _ = stop_tx.send(());

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            event_name = "system.server.shutdown_timeout",
            correlation_id = "shutdown",
            "in-flight requests did not drain before the grace period elapsed"
        ),
    }

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
