//! Submission endpoints.
//!
//! Both forms normalize to the same `Submission` before the coordinator
//! runs: `/submit` takes the raw document body with metadata headers,
//! `/submitForm` takes a multipart form with a `file` part and a JSON
//! `payload` part.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use utoipa::ToSchema;

use docrelay_core::Submission;

use crate::error::{outcome_response, ApiError, ErrorResponse, SubmitResponse};
use crate::state::AppState;

/// Metadata headers accepted on the binary submission form.
pub const HEADER_DOCUMENT_TYPE: &str = "x-document-type";
pub const HEADER_PARTICIPANT_ID: &str = "x-participant-id";
pub const HEADER_FILENAME: &str = "x-filename";

/// Structured metadata carried in the multipart `payload` part.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitPayload {
    pub document_type: Option<String>,
    pub participant_id: Option<String>,
    /// Overrides the filename of the uploaded part when set.
    pub filename: Option<String>,
}

/// Submit a binary document with metadata headers.
#[utoipa::path(
    post,
    path = "/document/v1/submit",
    tag = "documents",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Document stored and notification enqueued", body = SubmitResponse),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
        (status = 413, description = "Document too large"),
        (status = 500, description = "Storage or notification failure", body = ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let content_type = header_value(&headers, header::CONTENT_TYPE.as_str())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let filename = header_value(&headers, HEADER_FILENAME).unwrap_or_default();

    let submission = Submission::new(
        body,
        filename,
        content_type,
        header_value(&headers, HEADER_DOCUMENT_TYPE),
        header_value(&headers, HEADER_PARTICIPANT_ID),
    );

    run_submission(&state, submission).await
}

/// Submit a document as a multipart form (`file` + JSON `payload`).
#[utoipa::path(
    post,
    path = "/document/v1/submitForm",
    tag = "documents",
    responses(
        (status = 200, description = "Document stored and notification enqueued", body = SubmitResponse),
        (status = 400, description = "Invalid submission or malformed form", body = ErrorResponse),
        (status = 413, description = "Document too large"),
        (status = 500, description = "Storage or notification failure", body = ErrorResponse)
    )
)]
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut file: Option<(Bytes, String, String)> = None;
    let mut payload = SubmitPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedRequest(format!("unreadable multipart form: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::MalformedRequest(format!("unreadable file part: {}", e))
                })?;
                file = Some((data, filename, content_type));
            }
            Some("payload") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::MalformedRequest(format!("unreadable payload part: {}", e))
                })?;
                payload = serde_json::from_str(&text).map_err(|e| {
                    ApiError::MalformedRequest(format!("invalid payload JSON: {}", e))
                })?;
            }
            other => {
                tracing::debug!(part = ?other, "ignoring unknown multipart part");
            }
        }
    }

    let (content, part_filename, content_type) = file.ok_or_else(|| {
        ApiError::MalformedRequest("multipart form is missing the 'file' part".to_string())
    })?;

    let submission = Submission::new(
        content,
        payload.filename.unwrap_or(part_filename),
        content_type,
        payload.document_type,
        payload.participant_id,
    );

    run_submission(&state, submission).await
}

/// Run one submission through the coordinator and map the outcome.
async fn run_submission(state: &AppState, submission: Submission) -> Result<Response, ApiError> {
    tracing::info!(
        correlation_id = %submission.correlation_id,
        filename = %submission.filename,
        size_bytes = submission.content.len(),
        "submission received"
    );
    let outcome = state
        .coordinator
        .submit(&submission, &state.ingest)
        .await?;
    Ok(outcome_response(outcome))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
