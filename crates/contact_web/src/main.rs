//! Contact book HTTP server.

use contact_core::db::open_db;
use contact_core::{init_logging, FlashStore};
use contact_web::{router, AppConfig, AppState};
use log::{info, warn};
use std::time::Duration;

const FLASH_PURGE_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let log_dir = config.log_dir.to_string_lossy().into_owned();
    init_logging(&config.log_level, &log_dir)?;

    let conn = open_db(&config.db_path)?;
    let state = AppState::new(
        conn,
        FlashStore::new(config.session_idle),
        config.store_timeout,
    );

    let purge_state = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(FLASH_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            purge_state.flash().purge_expired();
        }
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        "event=server_start module=http status=ok bind={} db_path={} store_timeout_ms={} session_idle_secs={}",
        config.bind,
        config.db_path.display(),
        state.store_timeout().as_millis(),
        state.flash().idle_window().as_secs()
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=server_stop module=http status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=server_signal module=http status=error error={err}");
        std::future::pending::<()>().await;
    }
}
