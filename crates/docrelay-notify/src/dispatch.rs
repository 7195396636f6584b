//! Notification dispatcher: serialize and send.

use docrelay_core::Notification;

use crate::traits::{MessageHandle, NotifyQueue, NotifyResult};

/// Serialize a notification and send it on the queue.
///
/// Must only be called after the referenced object is durably stored, so a
/// consumer can never observe a notification for a missing document.
pub async fn dispatch(
    queue: &dyn NotifyQueue,
    notification: &Notification,
) -> NotifyResult<MessageHandle> {
    let payload = serde_json::to_string(notification)?;
    let start = std::time::Instant::now();

    let handle = queue.send(&payload).await.map_err(|e| {
        tracing::error!(
            error = %e,
            correlation_id = %notification.correlation_id,
            storage_key = %notification.storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "notification dispatch failed"
        );
        e
    })?;

    tracing::info!(
        correlation_id = %notification.correlation_id,
        storage_key = %notification.storage_key,
        message_id = %handle.message_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "notification dispatched"
    );

    Ok(handle)
}
