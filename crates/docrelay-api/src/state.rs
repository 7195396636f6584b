//! Shared application state.

use std::sync::Arc;

use docrelay_ingest::{Coordinator, IngestConfig};
use docrelay_notify::NotifyQueue;
use docrelay_storage::ObjectStore;

/// State shared by all handlers. The coordinator owns the backend handles;
/// the ingest config is passed explicitly into every submission so tests
/// can override it without shared mutable state.
pub struct AppState {
    pub coordinator: Coordinator,
    pub ingest: IngestConfig,
    pub max_document_size_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        queue: Arc<dyn NotifyQueue>,
        ingest: IngestConfig,
        max_document_size_bytes: usize,
    ) -> Self {
        Self {
            coordinator: Coordinator::new(store, queue),
            ingest,
            max_document_size_bytes,
        }
    }
}
