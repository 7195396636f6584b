//! Docrelay Notify Library
//!
//! Notification-queue abstraction and backends, plus the dispatcher that
//! serializes a [`docrelay_core::Notification`] and sends it. Failures are
//! classified transient/permanent the same way the storage crate does, so
//! the coordinator can apply one retry policy to both remote calls.

pub mod dispatch;
pub mod factory;
#[cfg(feature = "queue-memory")]
pub mod memory;
#[cfg(feature = "queue-sqs")]
pub mod sqs;
pub mod traits;

// Re-export commonly used types
pub use dispatch::dispatch;
pub use docrelay_core::QueueBackendKind;
pub use factory::create_queue;
#[cfg(feature = "queue-memory")]
pub use memory::MemoryQueue;
#[cfg(feature = "queue-sqs")]
pub use sqs::SqsQueue;
pub use traits::{MessageHandle, NotifyError, NotifyQueue, NotifyResult};
