use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use docrelay_api::{router, server, telemetry, AppState};
use docrelay_core::Config;
use docrelay_ingest::{IngestConfig, OrphanSweeper};
use docrelay_notify::create_queue;
use docrelay_storage::create_store;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    telemetry::init_telemetry();

    let store = create_store(&config).await?;
    let queue = create_queue(&config).await?;

    let ingest = IngestConfig {
        max_upload_attempts: config.max_upload_attempts,
        max_dispatch_attempts: config.max_dispatch_attempts,
        retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        dispatch_timeout: Duration::from_secs(config.dispatch_timeout_secs),
        ..IngestConfig::default()
    };

    let sweeper = config.sweep_enabled.then(|| {
        OrphanSweeper::new(
            Arc::clone(&store),
            Arc::clone(&queue),
            ingest.dead_letter_prefix.clone(),
        )
        .spawn(Duration::from_secs(config.sweep_interval_secs))
    });

    let state = Arc::new(AppState::new(
        store,
        queue,
        ingest,
        config.max_document_size_bytes,
    ));

    let app = router(state);
    server::start_server(&config, app).await?;

    if let Some(handle) = sweeper {
        handle.shutdown().await;
    }

    Ok(())
}
