//! Document-type catalog.
//!
//! Static reference data exposed on the `documentTypes` endpoint. Consumers
//! use the `code` as the `document_type` identity field on submissions.

use serde::Serialize;

/// One entry of the document-type reference data.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentType {
    pub code: String,
    pub description: String,
}

const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("FORM", "Structured claim form"),
    ("EVIDENCE", "Supporting evidence for a claim"),
    ("MEDICAL_RECORD", "Medical record or treatment note"),
    ("CORRESPONDENCE", "Correspondence with the claimant"),
    ("OTHER", "Uncategorized claims document"),
];

/// List the known document types.
pub fn list_types() -> Vec<DocumentType> {
    DOCUMENT_TYPES
        .iter()
        .map(|(code, description)| DocumentType {
            code: (*code).to_string(),
            description: (*description).to_string(),
        })
        .collect()
}
