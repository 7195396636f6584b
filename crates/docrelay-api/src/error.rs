//! HTTP error and outcome mapping.
//!
//! The transport maps `Accepted` to a success response, `InvalidSubmission`
//! to a client error, and every degraded outcome to a server error with a
//! machine-readable reason code. Ambiguous outcomes are never reported as a
//! bare success.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use docrelay_core::{IngestError, SubmissionOutcome, SubmissionReceipt};

/// Error body returned for every non-success response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable reason code for programmatic handling
    pub code: String,
    /// Whether retrying the identical submission may succeed
    pub recoverable: bool,
    /// Set when the document was durably stored despite the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

/// Success body for an accepted submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub correlation_id: uuid::Uuid,
    pub storage_key: String,
    pub etag: String,
    pub message_id: String,
    pub size_bytes: u64,
}

impl From<SubmissionReceipt> for SubmitResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            correlation_id: receipt.correlation_id,
            storage_key: receipt.storage_key,
            etag: receipt.etag,
            message_id: receipt.message_id,
            size_bytes: receipt.size_bytes,
        }
    }
}

/// Transport-level errors raised before the coordinator runs.
#[derive(Debug)]
pub enum ApiError {
    /// The submission's identity is malformed (coordinator rejected it).
    Invalid(IngestError),
    /// The request itself could not be read (bad multipart, bad headers).
    MalformedRequest(String),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::Invalid(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Invalid(err) => (
                StatusCode::from_u16(err.http_status_code())
                    .unwrap_or(StatusCode::BAD_REQUEST),
                ErrorResponse {
                    error: err.to_string(),
                    code: err.error_code().to_string(),
                    recoverable: false,
                    storage_key: None,
                },
            ),
            ApiError::MalformedRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    code: "MALFORMED_REQUEST".to_string(),
                    recoverable: false,
                    storage_key: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Map a terminal coordinator outcome onto an HTTP response.
pub fn outcome_response(outcome: SubmissionOutcome) -> Response {
    let code = outcome.reason_code().to_string();
    match outcome {
        SubmissionOutcome::Accepted(receipt) => {
            (StatusCode::OK, Json(SubmitResponse::from(receipt))).into_response()
        }
        SubmissionOutcome::StorageFailed { reason, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("document was not stored: {}", reason),
                code,
                recoverable: true,
                storage_key: None,
            }),
        )
            .into_response(),
        SubmissionOutcome::NotifyFailed {
            storage_key,
            reason,
            ..
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("document stored but notification lost: {}", reason),
                code,
                recoverable: false,
                storage_key: Some(storage_key),
            }),
        )
            .into_response(),
        SubmissionOutcome::PartialSuccess {
            storage_key,
            dead_letter_key,
            ..
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!(
                    "document stored, notification parked for redelivery at {}",
                    dead_letter_key
                ),
                code,
                recoverable: false,
                storage_key: Some(storage_key),
            }),
        )
            .into_response(),
    }
}
