//! Domain models for a single submission.
//!
//! Every value here is created once per submission and discarded after the
//! coordinator returns; the object store and the queue are the only durable
//! state in the system.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Canonical property map derived from a submission.
///
/// Used both as object-store metadata and as input to the notification
/// payload. Resolution is a pure function of the submission, so identical
/// submissions always produce identical attribute sets.
pub type AttributeSet = BTreeMap<String, String>;

/// One client-provided document plus metadata awaiting ingestion.
///
/// Immutable after construction. `correlation_id` and `submitted_at` are
/// assigned at request receipt so that everything derived from the
/// submission stays deterministic.
#[derive(Debug, Clone)]
pub struct Submission {
    pub content: Bytes,
    pub filename: String,
    pub content_type: String,
    pub document_type: Option<String>,
    pub participant_id: Option<String>,
    pub correlation_id: Uuid,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Create a submission stamped with a fresh correlation id and the
    /// current time. Transports normalize both the binary and the multipart
    /// form into this one shape before invoking the coordinator.
    pub fn new(
        content: Bytes,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        document_type: Option<String>,
        participant_id: Option<String>,
    ) -> Self {
        Self {
            content,
            filename: filename.into(),
            content_type: content_type.into(),
            document_type,
            participant_id,
            correlation_id: Uuid::new_v4(),
            submitted_at: Utc::now(),
        }
    }
}

/// Result of a successful durable write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub key: String,
    pub etag: String,
    pub version_id: Option<String>,
    pub size_bytes: u64,
}

/// Message payload enqueued to announce a newly stored document.
///
/// Carries the storage key so a consumer can never receive a notification
/// for a document that does not exist in the store, and the correlation id
/// so operators can trace a submission end to end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub correlation_id: Uuid,
    pub storage_key: String,
    pub etag: String,
    pub document_type: String,
    pub participant_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub submitted_at: DateTime<Utc>,
}

impl Notification {
    /// Build the notification for a completed upload.
    pub fn for_upload(submission: &Submission, descriptor: &UploadDescriptor) -> Self {
        Self {
            correlation_id: submission.correlation_id,
            storage_key: descriptor.key.clone(),
            etag: descriptor.etag.clone(),
            document_type: submission.document_type.clone().unwrap_or_default(),
            participant_id: submission.participant_id.clone().unwrap_or_default(),
            filename: submission.filename.clone(),
            content_type: submission.content_type.clone(),
            size_bytes: descriptor.size_bytes,
            submitted_at: submission.submitted_at,
        }
    }
}

/// What `Accepted` hands back to the transport layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub correlation_id: Uuid,
    pub storage_key: String,
    pub etag: String,
    pub message_id: String,
    pub size_bytes: u64,
}

/// Terminal outcome of one coordinator invocation.
///
/// The coordinator never reports `Accepted` unless both the write and the
/// notification succeeded, and never reports `StorageFailed` when the
/// document was in fact durably stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Document stored and notification enqueued.
    Accepted(SubmissionReceipt),
    /// The durable write failed; no notification was attempted and nothing
    /// was left behind in the store.
    StorageFailed {
        correlation_id: Uuid,
        reason: String,
    },
    /// Document stored, notification lost, and the orphan could not be
    /// recorded on the dead-letter path. Requires operator attention.
    NotifyFailed {
        correlation_id: Uuid,
        storage_key: String,
        reason: String,
    },
    /// Document stored but unannounced (the orphan case). The pending
    /// notification was parked on the dead-letter path for the sweeper.
    PartialSuccess {
        correlation_id: Uuid,
        storage_key: String,
        dead_letter_key: String,
    },
}

impl SubmissionOutcome {
    /// Machine-readable reason code, stable for API clients.
    pub fn reason_code(&self) -> &'static str {
        match self {
            SubmissionOutcome::Accepted(_) => "ACCEPTED",
            SubmissionOutcome::StorageFailed { .. } => "STORAGE_FAILED",
            SubmissionOutcome::NotifyFailed { .. } => "NOTIFY_FAILED",
            SubmissionOutcome::PartialSuccess { .. } => "PARTIAL_SUCCESS",
        }
    }

    /// Whether the document is durably stored regardless of notification
    /// state. True for every outcome except `StorageFailed`.
    pub fn is_stored(&self) -> bool {
        !matches!(self, SubmissionOutcome::StorageFailed { .. })
    }
}
