#[cfg(feature = "queue-memory")]
use crate::MemoryQueue;
#[cfg(feature = "queue-sqs")]
use crate::SqsQueue;
use crate::{NotifyError, NotifyQueue, NotifyResult, QueueBackendKind};
use docrelay_core::Config;
use std::sync::Arc;

/// Create a notification-queue backend based on configuration
pub async fn create_queue(config: &Config) -> NotifyResult<Arc<dyn NotifyQueue>> {
    match config.queue_backend {
        #[cfg(feature = "queue-sqs")]
        QueueBackendKind::Sqs => {
            let queue_url = config.sqs_queue_url.clone().ok_or_else(|| {
                NotifyError::ConfigError("SQS_QUEUE_URL not configured".to_string())
            })?;
            let region = config.sqs_region.clone().ok_or_else(|| {
                NotifyError::ConfigError("SQS_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.sqs_endpoint.clone();

            let queue = SqsQueue::new(queue_url, region, endpoint).await?;
            Ok(Arc::new(queue))
        }

        #[cfg(not(feature = "queue-sqs"))]
        QueueBackendKind::Sqs => Err(NotifyError::ConfigError(
            "SQS queue backend not available (queue-sqs feature not enabled)".to_string(),
        )),

        #[cfg(feature = "queue-memory")]
        QueueBackendKind::Memory => Ok(Arc::new(MemoryQueue::new())),

        #[cfg(not(feature = "queue-memory"))]
        QueueBackendKind::Memory => Err(NotifyError::ConfigError(
            "Memory queue backend not available (queue-memory feature not enabled)".to_string(),
        )),
    }
}
