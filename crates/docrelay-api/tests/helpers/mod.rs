//! Test helpers: build AppState and router against local backends.
//!
//! Run from workspace root: `cargo test -p docrelay-api --test submit_test`
//! or `cargo test -p docrelay-api`. No external services required.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use tempfile::TempDir;

use docrelay_api::{router, AppState};
use docrelay_ingest::IngestConfig;
use docrelay_notify::MemoryQueue;
use docrelay_storage::{LocalStore, ObjectStore};

/// Test application: server plus handles for inspecting side effects.
pub struct TestApp {
    pub server: TestServer,
    pub queue: MemoryQueue,
    pub store: Arc<dyn ObjectStore>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup test app with isolated local storage and an in-memory queue.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("create temp dir");
    let store: Arc<dyn ObjectStore> = Arc::new(
        LocalStore::new(temp_dir.path())
            .await
            .expect("create local store"),
    );
    let queue = MemoryQueue::new();

    let ingest = IngestConfig {
        retry_backoff: Duration::from_millis(1),
        ..IngestConfig::default()
    };

    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        Arc::new(queue.clone()),
        ingest,
        1024 * 1024,
    ));

    let server = TestServer::new(router(state)).expect("start test server");

    TestApp {
        server,
        queue,
        store,
        _temp_dir: temp_dir,
    }
}
