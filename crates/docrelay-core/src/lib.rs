//! Docrelay Core Library
//!
//! This crate provides the domain models, attribute resolution, storage key
//! derivation, document-type catalog, error taxonomy, and configuration that
//! are shared across all docrelay components.

pub mod attributes;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;

// Re-export commonly used types
pub use attributes::resolve;
pub use backend::{QueueBackendKind, StorageBackendKind};
pub use catalog::{list_types, DocumentType};
pub use config::Config;
pub use error::IngestError;
pub use keys::derive_key;
pub use models::{
    AttributeSet, Notification, Submission, SubmissionOutcome, SubmissionReceipt,
    UploadDescriptor,
};
