use crate::traits::{MessageHandle, NotifyError, NotifyQueue, NotifyResult};
use crate::QueueBackendKind;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sqs::Client;

/// Service error codes that are worth retrying.
const TRANSIENT_CODES: &[&str] = &[
    "RequestThrottled",
    "ThrottlingException",
    "InternalError",
    "ServiceUnavailable",
    "KmsThrottled",
];

/// SQS queue implementation
#[derive(Clone)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    /// Create a new SqsQueue instance
    ///
    /// # Arguments
    /// * `queue_url` - Full SQS queue URL
    /// * `region` - AWS region
    /// * `endpoint_url` - Optional custom endpoint (e.g. LocalStack)
    ///
    /// SDK-level automatic retries are disabled: the ingestion coordinator
    /// owns the retry policy.
    pub async fn new(
        queue_url: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> NotifyResult<Self> {
        let region_provider = RegionProviderChain::first_try(aws_config::Region::new(region));

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(aws_config::retry::RetryConfig::disabled());
        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        Ok(SqsQueue {
            client: Client::new(&config),
            queue_url,
        })
    }
}

/// Classify an SDK failure transient/permanent for the caller's retry
/// decision.
fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> NotifyError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            NotifyError::Transient(err.to_string())
        }
        SdkError::ServiceError(ctx) => {
            let code = ctx.err().code().unwrap_or_default();
            let detail = format!("{}: {}", code, ctx.err());
            if TRANSIENT_CODES.contains(&code) {
                NotifyError::Transient(detail)
            } else {
                NotifyError::Permanent(detail)
            }
        }
        _ => NotifyError::Permanent(err.to_string()),
    }
}

#[async_trait]
impl NotifyQueue for SqsQueue {
    async fn send(&self, payload: &str) -> NotifyResult<MessageHandle> {
        let start = std::time::Instant::now();

        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(payload)
            .send()
            .await
            .map_err(|e| {
                let classified = classify_sdk_error(e);
                tracing::error!(
                    error = %classified,
                    queue_url = %self.queue_url,
                    payload_bytes = payload.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "SQS send failed"
                );
                classified
            })?;

        let message_id = output
            .message_id()
            .map(str::to_string)
            .ok_or_else(|| NotifyError::Permanent("SQS returned no message id".to_string()))?;

        tracing::info!(
            queue_url = %self.queue_url,
            message_id = %message_id,
            payload_bytes = payload.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "SQS send successful"
        );

        Ok(MessageHandle { message_id })
    }

    fn backend_kind(&self) -> QueueBackendKind {
        QueueBackendKind::Sqs
    }
}
