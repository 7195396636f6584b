//! Docrelay Storage Library
//!
//! Object-store abstraction and backends. The `ObjectStore` trait exposes
//! the durable-write surface the ingestion coordinator needs (`put`) plus
//! the small read/list surface the dead-letter sweep relies on.
//!
//! # Error classification
//!
//! Every failure is classified transient (timeout, throttling, 5xx) or
//! permanent (4xx, invalid bucket, bad key) so callers can decide whether a
//! retry is worthwhile. Keys must not contain `..` or a leading `/`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use docrelay_core::StorageBackendKind;
pub use factory::create_store;
#[cfg(feature = "storage-local")]
pub use local::LocalStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3Store;
pub use traits::{ObjectStore, PutResult, StorageError, StorageResult};
