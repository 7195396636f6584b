//! Ingestion coordinator.
//!
//! One invocation drives a single submission through
//! `resolve → derive key → upload → dispatch` and returns a terminal
//! [`SubmissionOutcome`]. The two remote calls are strictly ordered: the
//! dispatch never begins before the upload has confirmed success, so a
//! consumer can never see a notification for a document that is not in the
//! store.

use std::sync::Arc;

use bytes::Bytes;
use tokio::time::{sleep, timeout};

use docrelay_core::{
    attributes, derive_key, resolve, IngestError, Notification, Submission, SubmissionOutcome,
    SubmissionReceipt, UploadDescriptor,
};
use docrelay_notify::{dispatch, MessageHandle, NotifyError, NotifyQueue};
use docrelay_storage::{ObjectStore, StorageError};

use crate::config::{retry_backoff, IngestConfig};

/// Coordinates the durable write and the notification for one submission.
///
/// Holds no per-submission state; a single instance serves arbitrary
/// concurrent submissions.
pub struct Coordinator {
    store: Arc<dyn ObjectStore>,
    queue: Arc<dyn NotifyQueue>,
}

impl Coordinator {
    pub fn new(store: Arc<dyn ObjectStore>, queue: Arc<dyn NotifyQueue>) -> Self {
        Self { store, queue }
    }

    /// Process one submission to a terminal outcome.
    ///
    /// Returns `Err(InvalidSubmission)` only for malformed identity, before
    /// any I/O. Every I/O failure is folded into the outcome taxonomy;
    /// nothing is logged-and-swallowed as success.
    #[tracing::instrument(
        skip(self, submission, config),
        fields(correlation_id = %submission.correlation_id)
    )]
    pub async fn submit(
        &self,
        submission: &Submission,
        config: &IngestConfig,
    ) -> Result<SubmissionOutcome, IngestError> {
        let attrs = resolve(submission);
        let key = derive_key(submission, &attrs)?;

        let descriptor = match self.upload_with_retry(submission, &key, &attrs, config).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    storage_key = %key,
                    "upload failed, submission rejected"
                );
                return Ok(SubmissionOutcome::StorageFailed {
                    correlation_id: submission.correlation_id,
                    reason: e.to_string(),
                });
            }
        };

        let notification = Notification::for_upload(submission, &descriptor);

        match self.dispatch_with_retry(&notification, config).await {
            Ok(handle) => {
                tracing::info!(
                    storage_key = %descriptor.key,
                    message_id = %handle.message_id,
                    "submission accepted"
                );
                Ok(SubmissionOutcome::Accepted(SubmissionReceipt {
                    correlation_id: submission.correlation_id,
                    storage_key: descriptor.key,
                    etag: descriptor.etag,
                    message_id: handle.message_id,
                    size_bytes: descriptor.size_bytes,
                }))
            }
            Err(e) => self.park_orphan(&notification, config, &e).await,
        }
    }

    /// Upload with bounded retry. Each attempt runs under its own timeout;
    /// an elapsed timeout counts as transient.
    async fn upload_with_retry(
        &self,
        submission: &Submission,
        key: &str,
        attrs: &docrelay_core::AttributeSet,
        config: &IngestConfig,
    ) -> Result<UploadDescriptor, StorageError> {
        let content_type = attrs
            .get(attributes::ATTR_CONTENT_TYPE)
            .map(String::as_str)
            .unwrap_or("application/octet-stream");

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let result = timeout(
                config.upload_timeout,
                self.store
                    .put(key, submission.content.clone(), content_type, attrs),
            )
            .await
            .unwrap_or_else(|_| {
                Err(StorageError::Transient(format!(
                    "upload timed out after {:?}",
                    config.upload_timeout
                )))
            });

            match result {
                Ok(put) => {
                    return Ok(UploadDescriptor {
                        key: key.to_string(),
                        etag: put.etag,
                        version_id: put.version_id,
                        size_bytes: submission.content.len() as u64,
                    });
                }
                Err(e) if e.is_transient() && attempt < config.max_upload_attempts => {
                    let delay = retry_backoff(config.retry_backoff, attempt);
                    tracing::warn!(
                        error = %e,
                        storage_key = %key,
                        attempt,
                        max_attempts = config.max_upload_attempts,
                        backoff_ms = delay.as_millis() as u64,
                        "transient upload failure, retrying"
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Dispatch with bounded retry, same policy as the upload side.
    async fn dispatch_with_retry(
        &self,
        notification: &Notification,
        config: &IngestConfig,
    ) -> Result<MessageHandle, NotifyError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let result = timeout(
                config.dispatch_timeout,
                dispatch(self.queue.as_ref(), notification),
            )
            .await
            .unwrap_or_else(|_| {
                Err(NotifyError::Transient(format!(
                    "dispatch timed out after {:?}",
                    config.dispatch_timeout
                )))
            });

            match result {
                Ok(handle) => return Ok(handle),
                Err(e) if e.is_transient() && attempt < config.max_dispatch_attempts => {
                    let delay = retry_backoff(config.retry_backoff, attempt);
                    tracing::warn!(
                        error = %e,
                        storage_key = %notification.storage_key,
                        attempt,
                        max_attempts = config.max_dispatch_attempts,
                        backoff_ms = delay.as_millis() as u64,
                        "transient dispatch failure, retrying"
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Reconcile the orphan case: the document is durably stored but the
    /// notification could not be delivered. The pending notification is
    /// parked as a JSON marker on the dead-letter path so the sweeper can
    /// re-announce it; the stored document is never rolled back.
    async fn park_orphan(
        &self,
        notification: &Notification,
        config: &IngestConfig,
        cause: &NotifyError,
    ) -> Result<SubmissionOutcome, IngestError> {
        let dead_letter_key = dead_letter_key(&config.dead_letter_prefix, notification);

        let marker = match serde_json::to_vec(notification) {
            Ok(marker) => marker,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    storage_key = %notification.storage_key,
                    "orphan marker serialization failed"
                );
                return Ok(SubmissionOutcome::NotifyFailed {
                    correlation_id: notification.correlation_id,
                    storage_key: notification.storage_key.clone(),
                    reason: format!("dispatch failed ({}), marker unserializable: {}", cause, e),
                });
            }
        };

        let park_result = timeout(
            config.upload_timeout,
            self.store.put(
                &dead_letter_key,
                Bytes::from(marker),
                "application/json",
                &docrelay_core::AttributeSet::new(),
            ),
        )
        .await
        .unwrap_or_else(|_| {
            Err(StorageError::Transient(format!(
                "dead-letter write timed out after {:?}",
                config.upload_timeout
            )))
        });

        match park_result {
            Ok(_) => {
                tracing::warn!(
                    storage_key = %notification.storage_key,
                    dead_letter_key = %dead_letter_key,
                    cause = %cause,
                    "notification parked on dead-letter path"
                );
                Ok(SubmissionOutcome::PartialSuccess {
                    correlation_id: notification.correlation_id,
                    storage_key: notification.storage_key.clone(),
                    dead_letter_key,
                })
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    storage_key = %notification.storage_key,
                    cause = %cause,
                    "dead-letter parking failed, orphan is unrecorded"
                );
                Ok(SubmissionOutcome::NotifyFailed {
                    correlation_id: notification.correlation_id,
                    storage_key: notification.storage_key.clone(),
                    reason: format!("dispatch failed ({}), dead-letter write failed: {}", cause, e),
                })
            }
        }
    }
}

/// Dead-letter marker key for a notification. One marker per submission:
/// the correlation id keeps retries of the same parking idempotent.
fn dead_letter_key(prefix: &str, notification: &Notification) -> String {
    format!("{}/{}.json", prefix, notification.correlation_id)
}
