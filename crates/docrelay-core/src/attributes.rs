//! Attribute resolution: canonical property map for a submission.
//!
//! Resolution is a total, pure function. Malformed input degrades to safe
//! defaults instead of erroring; whether the submission is actually
//! ingestible is decided later by key derivation.

use crate::models::{AttributeSet, Submission};

pub const ATTR_CORRELATION_ID: &str = "correlation-id";
pub const ATTR_DOCUMENT_TYPE: &str = "document-type";
pub const ATTR_PARTICIPANT_ID: &str = "participant-id";
pub const ATTR_FILENAME: &str = "filename";
pub const ATTR_CONTENT_TYPE: &str = "content-type";
pub const ATTR_SIZE_BYTES: &str = "size-bytes";
pub const ATTR_SUBMITTED_AT: &str = "submitted-at";

/// Fallback filename when the client-supplied name sanitizes to nothing.
pub const DEFAULT_FILENAME: &str = "document";

/// Fallback for absent identity fields in the attribute map. Key derivation
/// still rejects submissions whose identity fields are missing; this default
/// only keeps the attribute map total.
pub const UNKNOWN: &str = "unknown";

/// Derive the canonical attribute set for a submission.
///
/// Deterministic: calling twice on the same submission yields identical
/// maps. Submission time is read from the value captured at receipt, never
/// from a global clock.
pub fn resolve(submission: &Submission) -> AttributeSet {
    let mut attributes = AttributeSet::new();
    attributes.insert(
        ATTR_CORRELATION_ID.to_string(),
        submission.correlation_id.to_string(),
    );
    attributes.insert(
        ATTR_DOCUMENT_TYPE.to_string(),
        normalized_or_unknown(submission.document_type.as_deref()),
    );
    attributes.insert(
        ATTR_PARTICIPANT_ID.to_string(),
        normalized_or_unknown(submission.participant_id.as_deref()),
    );
    attributes.insert(
        ATTR_FILENAME.to_string(),
        sanitize_filename(&submission.filename),
    );
    attributes.insert(
        ATTR_CONTENT_TYPE.to_string(),
        if submission.content_type.trim().is_empty() {
            "application/octet-stream".to_string()
        } else {
            submission.content_type.trim().to_string()
        },
    );
    attributes.insert(
        ATTR_SIZE_BYTES.to_string(),
        submission.content.len().to_string(),
    );
    attributes.insert(
        ATTR_SUBMITTED_AT.to_string(),
        submission.submitted_at.to_rfc3339(),
    );
    attributes
}

fn normalized_or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Reduce a client-supplied filename to a path-safe form.
///
/// Takes the last path component (clients sometimes send full paths),
/// replaces anything outside `[A-Za-z0-9._-]` with `-`, and strips leading
/// dots so the result can never be a hidden file or traversal fragment.
/// Degrades to [`DEFAULT_FILENAME`] rather than erroring.
pub fn sanitize_filename(raw: &str) -> String {
    let last_component = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = last_component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn submission() -> Submission {
        Submission::new(
            Bytes::from_static(b"0123456789"),
            "a.pdf",
            "application/pdf",
            Some("FORM".to_string()),
            Some("p-123".to_string()),
        )
    }

    #[test]
    fn resolve_is_deterministic() {
        let s = submission();
        assert_eq!(resolve(&s), resolve(&s));
    }

    #[test]
    fn resolve_captures_identity_fields() {
        let s = submission();
        let attrs = resolve(&s);
        assert_eq!(attrs[ATTR_DOCUMENT_TYPE], "FORM");
        assert_eq!(attrs[ATTR_PARTICIPANT_ID], "p-123");
        assert_eq!(attrs[ATTR_FILENAME], "a.pdf");
        assert_eq!(attrs[ATTR_SIZE_BYTES], "10");
        assert_eq!(attrs[ATTR_CORRELATION_ID], s.correlation_id.to_string());
    }

    #[test]
    fn resolve_degrades_missing_fields_to_defaults() {
        let s = Submission::new(Bytes::new(), "", "", None, Some("  ".to_string()));
        let attrs = resolve(&s);
        assert_eq!(attrs[ATTR_DOCUMENT_TYPE], UNKNOWN);
        assert_eq!(attrs[ATTR_PARTICIPANT_ID], UNKNOWN);
        assert_eq!(attrs[ATTR_FILENAME], DEFAULT_FILENAME);
        assert_eq!(attrs[ATTR_CONTENT_TYPE], "application/octet-stream");
    }

    #[test]
    fn sanitize_strips_paths_and_specials() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\claim form.pdf"), "claim-form.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("répört.pdf"), "r-p-rt.pdf");
        assert_eq!(sanitize_filename("..."), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename(""), DEFAULT_FILENAME);
    }
}
