//! Orphan sweeper: re-announces documents that were stored but never
//! successfully notified.
//!
//! The coordinator parks each undeliverable notification as a JSON marker
//! under the dead-letter prefix. The sweeper periodically lists that prefix,
//! re-dispatches each marker, and deletes markers whose dispatch succeeded.
//! Delivery stays at-least-once end to end; a marker is only removed after
//! the queue confirmed the send.
//!
//! Shutdown: [`SweeperHandle::shutdown`] signals the loop to stop; it does
//! not wait for an in-flight sweep. Allow time for a running sweep to finish
//! before process exit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use docrelay_core::Notification;
use docrelay_notify::{dispatch, NotifyQueue};
use docrelay_storage::ObjectStore;

/// Result of one sweep pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Markers whose notification was re-dispatched and deleted.
    pub redispatched: usize,
    /// Markers whose dispatch failed again; left in place for the next pass.
    pub remaining: usize,
    /// Markers that could not be read or parsed; left in place and logged.
    pub skipped: usize,
}

/// Background job that drains the dead-letter prefix.
pub struct OrphanSweeper {
    store: Arc<dyn ObjectStore>,
    queue: Arc<dyn NotifyQueue>,
    dead_letter_prefix: String,
}

/// Handle to a spawned sweeper loop.
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SweeperHandle {
    /// Signal the sweeper loop to stop after its current iteration.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl OrphanSweeper {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        queue: Arc<dyn NotifyQueue>,
        dead_letter_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            queue,
            dead_letter_prefix: dead_letter_prefix.into(),
        }
    }

    /// Run one sweep pass over the dead-letter prefix.
    ///
    /// Unparseable markers are never deleted: losing the marker would lose
    /// the only record of the orphan.
    #[tracing::instrument(skip(self), fields(prefix = %self.dead_letter_prefix))]
    pub async fn sweep(&self) -> SweepReport {
        let prefix = format!("{}/", self.dead_letter_prefix.trim_end_matches('/'));
        let keys = match self.store.list(&prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(error = %e, "dead-letter listing failed, skipping sweep");
                return SweepReport::default();
            }
        };

        let mut report = SweepReport::default();
        for key in keys {
            match self.resend(&key).await {
                Ok(true) => report.redispatched += 1,
                Ok(false) => report.remaining += 1,
                Err(()) => report.skipped += 1,
            }
        }

        if report != SweepReport::default() {
            tracing::info!(
                redispatched = report.redispatched,
                remaining = report.remaining,
                skipped = report.skipped,
                "orphan sweep finished"
            );
        }
        report
    }

    /// Re-dispatch one marker. `Ok(true)` = delivered and deleted,
    /// `Ok(false)` = dispatch failed (marker kept), `Err(())` = marker
    /// unreadable/unparseable (kept, counted as skipped).
    async fn resend(&self, key: &str) -> Result<bool, ()> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, dead_letter_key = %key, "orphan marker unreadable");
                return Err(());
            }
        };

        let notification: Notification = match serde_json::from_slice(&raw) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, dead_letter_key = %key, "orphan marker unparseable");
                return Err(());
            }
        };

        match dispatch(self.queue.as_ref(), &notification).await {
            Ok(handle) => {
                tracing::info!(
                    correlation_id = %notification.correlation_id,
                    storage_key = %notification.storage_key,
                    message_id = %handle.message_id,
                    dead_letter_key = %key,
                    "orphaned notification re-dispatched"
                );
                if let Err(e) = self.store.delete(key).await {
                    // Marker stays; the next pass will send a duplicate,
                    // which the at-least-once contract already permits.
                    tracing::warn!(error = %e, dead_letter_key = %key, "marker cleanup failed");
                }
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    dead_letter_key = %key,
                    "re-dispatch failed, marker kept for next sweep"
                );
                Ok(false)
            }
        }
    }

    /// Spawn the periodic sweep loop. The loop runs one pass, then waits
    /// `interval` or a shutdown signal, whichever comes first.
    pub fn spawn(self, interval: Duration) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            tracing::info!(
                interval_secs = interval.as_secs(),
                prefix = %self.dead_letter_prefix,
                "orphan sweeper started"
            );
            loop {
                self.sweep().await;
                tokio::select! {
                    _ = sleep(interval) => {}
                    _ = shutdown_rx.recv() => {
                        tracing::info!("orphan sweeper stopped");
                        break;
                    }
                }
            }
        });

        SweeperHandle { shutdown_tx }
    }
}
