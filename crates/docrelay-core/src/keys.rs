//! Storage key derivation.
//!
//! Keys are content-addressed:
//! `documents/{document_type}/{participant_id}/{sha256[..16]}-{filename}`.
//!
//! Identical submissions derive the identical key, so an at-least-once retry
//! overwrites instead of duplicating; different content under the same name
//! hashes to a distinct key. Key derivation is centralized here so every
//! component agrees on the layout.

use sha2::{Digest, Sha256};

use crate::attributes::{sanitize_filename, ATTR_FILENAME};
use crate::error::IngestError;
use crate::models::{AttributeSet, Submission};

/// Prefix under which ingested documents live.
pub const DOCUMENT_PREFIX: &str = "documents";

/// Prefix under which orphaned-notification markers are parked.
pub const DEAD_LETTER_PREFIX: &str = "dead-letter";

/// Number of hex characters of the content digest embedded in the key.
const DIGEST_PREFIX_LEN: usize = 16;

/// Derive the storage key for a submission.
///
/// Fails with [`IngestError::InvalidSubmission`] only when identity is
/// malformed: empty content, or a document type / participant id that is
/// absent or sanitizes to nothing. No I/O is performed.
pub fn derive_key(
    submission: &Submission,
    attributes: &AttributeSet,
) -> Result<String, IngestError> {
    if submission.content.is_empty() {
        return Err(IngestError::InvalidSubmission(
            "submission content is empty".to_string(),
        ));
    }

    let document_type = identity_segment(submission.document_type.as_deref(), "document type")?;
    let participant_id = identity_segment(submission.participant_id.as_deref(), "participant id")?;

    let filename = attributes
        .get(ATTR_FILENAME)
        .cloned()
        .unwrap_or_else(|| sanitize_filename(&submission.filename));

    let digest = hex::encode(Sha256::digest(&submission.content));

    Ok(format!(
        "{}/{}/{}/{}-{}",
        DOCUMENT_PREFIX,
        document_type,
        participant_id,
        &digest[..DIGEST_PREFIX_LEN],
        filename
    ))
}

/// Validate and sanitize one identity path segment.
fn identity_segment(value: Option<&str>, field: &str) -> Result<String, IngestError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| IngestError::InvalidSubmission(format!("missing {}", field)))?;

    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '-') {
        return Err(IngestError::InvalidSubmission(format!(
            "{} is not path-safe: {:?}",
            field, raw
        )));
    }
    Ok(cleaned)
}
