//! Error taxonomy shared across docrelay components.
//!
//! Storage and queue failures carry their own transient/permanent
//! classification in `docrelay-storage` and `docrelay-notify`; this module
//! holds the caller-error side of the taxonomy plus the metadata used to map
//! errors onto HTTP responses.

use thiserror::Error;

/// Errors raised before any I/O is attempted.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The submission's identity is malformed. Caller error, 4xx-equivalent;
    /// nothing was written and no notification was attempted.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
}

impl IngestError {
    /// Machine-readable error code for API clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::InvalidSubmission(_) => "INVALID_SUBMISSION",
        }
    }

    /// HTTP status code the transport should map this error to.
    pub fn http_status_code(&self) -> u16 {
        match self {
            IngestError::InvalidSubmission(_) => 400,
        }
    }
}
