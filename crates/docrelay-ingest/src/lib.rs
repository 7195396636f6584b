//! Docrelay Ingest Library
//!
//! The ingestion coordinator: derives storage identity from a submission,
//! performs the durable write, dispatches the notification, and reconciles
//! partial failure onto the dead-letter path. Also home to the orphan
//! sweeper that re-announces parked notifications.

pub mod config;
pub mod coordinator;
pub mod sweeper;

// Re-export commonly used types
pub use config::{retry_backoff, IngestConfig, MAX_RETRY_BACKOFF};
pub use coordinator::Coordinator;
pub use sweeper::{OrphanSweeper, SweepReport, SweeperHandle};
