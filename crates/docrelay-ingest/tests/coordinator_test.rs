//! Coordinator scenario tests against scripted in-memory backends.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use docrelay_core::{
    AttributeSet, Notification, QueueBackendKind, StorageBackendKind, Submission,
    SubmissionOutcome,
};
use docrelay_ingest::{Coordinator, IngestConfig, OrphanSweeper};
use docrelay_notify::{MessageHandle, NotifyError, NotifyQueue, NotifyResult};
use docrelay_storage::{ObjectStore, PutResult, StorageError, StorageResult};

/// Object store double: in-memory map plus a scripted directive per put.
/// An empty script means every put succeeds.
#[derive(Default)]
struct FakeStore {
    objects: Mutex<HashMap<String, Bytes>>,
    put_calls: AtomicUsize,
    put_script: Mutex<VecDeque<Result<(), StorageError>>>,
    put_delay: Option<Duration>,
}

impl FakeStore {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_put_script(script: Vec<Result<(), StorageError>>) -> Arc<Self> {
        Arc::new(Self {
            put_script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    fn with_put_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            put_delay: Some(delay),
            ..Self::default()
        })
    }

    fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    fn stored_keys(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        _content_type: &str,
        _metadata: &AttributeSet,
    ) -> StorageResult<PutResult> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(directive) = self.put_script.lock().unwrap().pop_front() {
            directive?;
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(PutResult {
            etag: format!("etag-{}", key.len()),
            version_id: None,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self.stored_keys(prefix))
    }

    fn backend_kind(&self) -> StorageBackendKind {
        StorageBackendKind::Local
    }
}

/// Queue double: records payloads, one scripted directive per send.
#[derive(Default)]
struct FakeQueue {
    sent: Mutex<Vec<String>>,
    send_calls: AtomicUsize,
    send_script: Mutex<VecDeque<Result<(), NotifyError>>>,
}

impl FakeQueue {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_send_script(script: Vec<Result<(), NotifyError>>) -> Arc<Self> {
        Arc::new(Self {
            send_script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifyQueue for FakeQueue {
    async fn send(&self, payload: &str) -> NotifyResult<MessageHandle> {
        let calls = self.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(directive) = self.send_script.lock().unwrap().pop_front() {
            directive?;
        }
        self.sent.lock().unwrap().push(payload.to_string());
        Ok(MessageHandle {
            message_id: format!("msg-{}", calls),
        })
    }

    fn backend_kind(&self) -> QueueBackendKind {
        QueueBackendKind::Memory
    }
}

fn submission() -> Submission {
    Submission::new(
        Bytes::from_static(b"0123456789"),
        "a.pdf",
        "application/pdf",
        Some("FORM".to_string()),
        Some("p-123".to_string()),
    )
}

fn fast_config() -> IngestConfig {
    IngestConfig {
        max_upload_attempts: 3,
        max_dispatch_attempts: 3,
        retry_backoff: Duration::from_millis(1),
        upload_timeout: Duration::from_secs(5),
        dispatch_timeout: Duration::from_secs(5),
        dead_letter_prefix: "dead-letter".to_string(),
    }
}

#[tokio::test]
async fn accepted_with_one_write_and_one_send() {
    let store = FakeStore::new();
    let queue = FakeQueue::new();
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let s = submission();
    let outcome = coordinator.submit(&s, &fast_config()).await.unwrap();

    let receipt = match outcome {
        SubmissionOutcome::Accepted(receipt) => receipt,
        other => panic!("expected Accepted, got {:?}", other),
    };
    assert!(receipt.storage_key.starts_with("documents/FORM/p-123/"));
    assert!(receipt.storage_key.ends_with("-a.pdf"));
    assert_eq!(receipt.size_bytes, 10);
    assert_eq!(store.put_calls(), 1);
    assert_eq!(queue.send_calls(), 1);

    // The notification on the wire references exactly the stored object.
    let sent = queue.sent();
    let notification: Notification = serde_json::from_str(&sent[0]).unwrap();
    assert_eq!(notification.storage_key, receipt.storage_key);
    assert_eq!(notification.etag, receipt.etag);
    assert_eq!(notification.correlation_id, s.correlation_id);
    assert!(store.exists(&receipt.storage_key).await.unwrap());
}

#[tokio::test]
async fn permanent_storage_error_skips_dispatch() {
    let store =
        FakeStore::with_put_script(vec![Err(StorageError::Permanent("no such bucket".into()))]);
    let queue = FakeQueue::new();
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let outcome = coordinator
        .submit(&submission(), &fast_config())
        .await
        .unwrap();

    assert!(matches!(outcome, SubmissionOutcome::StorageFailed { .. }));
    assert!(!outcome.is_stored());
    assert_eq!(store.put_calls(), 1, "permanent errors must not be retried");
    assert_eq!(queue.send_calls(), 0);
    assert!(store.stored_keys("").is_empty(), "nothing left behind");
}

#[tokio::test]
async fn transient_storage_error_is_retried_then_accepted() {
    let store = FakeStore::with_put_script(vec![
        Err(StorageError::Transient("throttled".into())),
        Ok(()),
    ]);
    let queue = FakeQueue::new();
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let outcome = coordinator
        .submit(&submission(), &fast_config())
        .await
        .unwrap();

    assert!(matches!(outcome, SubmissionOutcome::Accepted(_)));
    assert_eq!(store.put_calls(), 2);
    assert_eq!(queue.send_calls(), 1);
}

#[tokio::test]
async fn exhausted_upload_retries_fail_storage() {
    let store = FakeStore::with_put_script(vec![
        Err(StorageError::Transient("throttled".into())),
        Err(StorageError::Transient("throttled".into())),
        Err(StorageError::Transient("throttled".into())),
    ]);
    let queue = FakeQueue::new();
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let outcome = coordinator
        .submit(&submission(), &fast_config())
        .await
        .unwrap();

    assert!(matches!(outcome, SubmissionOutcome::StorageFailed { .. }));
    assert_eq!(store.put_calls(), 3);
    assert_eq!(queue.send_calls(), 0);
}

#[tokio::test]
async fn upload_timeout_counts_as_transient() {
    let store = FakeStore::with_put_delay(Duration::from_millis(100));
    let queue = FakeQueue::new();
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let config = IngestConfig {
        max_upload_attempts: 2,
        upload_timeout: Duration::from_millis(5),
        retry_backoff: Duration::from_millis(1),
        ..fast_config()
    };

    let outcome = coordinator.submit(&submission(), &config).await.unwrap();

    assert!(matches!(outcome, SubmissionOutcome::StorageFailed { .. }));
    assert_eq!(store.put_calls(), 2);
    assert_eq!(queue.send_calls(), 0);
}

#[tokio::test]
async fn permanent_dispatch_failure_parks_orphan() {
    let store = FakeStore::new();
    let queue =
        FakeQueue::with_send_script(vec![Err(NotifyError::Permanent("no such queue".into()))]);
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let s = submission();
    let outcome = coordinator.submit(&s, &fast_config()).await.unwrap();

    let (storage_key, dead_letter_key) = match outcome {
        SubmissionOutcome::PartialSuccess {
            storage_key,
            dead_letter_key,
            correlation_id,
        } => {
            assert_eq!(correlation_id, s.correlation_id);
            (storage_key, dead_letter_key)
        }
        other => panic!("expected PartialSuccess, got {:?}", other),
    };

    // No rollback: the document stays retrievable.
    assert!(store.exists(&storage_key).await.unwrap());
    assert_eq!(queue.send_calls(), 1, "permanent errors must not be retried");

    // The parked marker is the notification the sweeper will re-send.
    let marker = store.get(&dead_letter_key).await.unwrap();
    let parked: Notification = serde_json::from_slice(&marker).unwrap();
    assert_eq!(parked.storage_key, storage_key);
}

#[tokio::test]
async fn exhausted_dispatch_retries_park_orphan() {
    let store = FakeStore::new();
    let queue = FakeQueue::with_send_script(vec![
        Err(NotifyError::Transient("throttled".into())),
        Err(NotifyError::Transient("throttled".into())),
        Err(NotifyError::Transient("throttled".into())),
    ]);
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let outcome = coordinator
        .submit(&submission(), &fast_config())
        .await
        .unwrap();

    assert!(matches!(outcome, SubmissionOutcome::PartialSuccess { .. }));
    assert!(outcome.is_stored());
    assert_eq!(queue.send_calls(), 3);
    assert_eq!(store.stored_keys("dead-letter/").len(), 1);
}

#[tokio::test]
async fn failed_dead_letter_parking_is_notify_failed() {
    // First put (the document) succeeds, second put (the marker) fails.
    let store = FakeStore::with_put_script(vec![
        Ok(()),
        Err(StorageError::Permanent("bucket gone".into())),
    ]);
    let queue =
        FakeQueue::with_send_script(vec![Err(NotifyError::Permanent("no such queue".into()))]);
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let outcome = coordinator
        .submit(&submission(), &fast_config())
        .await
        .unwrap();

    match outcome {
        SubmissionOutcome::NotifyFailed {
            ref storage_key, ..
        } => {
            // Still stored, still distinguishable from StorageFailed.
            assert!(store.exists(storage_key).await.unwrap());
        }
        other => panic!("expected NotifyFailed, got {:?}", other),
    }
    assert!(outcome.is_stored());
}

#[tokio::test]
async fn identical_resubmission_overwrites_same_key() {
    let store = FakeStore::new();
    let queue = FakeQueue::new();
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let s = submission();
    let first = coordinator.submit(&s, &fast_config()).await.unwrap();
    let second = coordinator.submit(&s, &fast_config()).await.unwrap();

    let key_of = |outcome: &SubmissionOutcome| match outcome {
        SubmissionOutcome::Accepted(receipt) => receipt.storage_key.clone(),
        other => panic!("expected Accepted, got {:?}", other),
    };
    assert_eq!(key_of(&first), key_of(&second));
    assert_eq!(store.stored_keys("documents/").len(), 1, "no duplicate document");
    // A second notification is the accepted at-least-once trade-off.
    assert_eq!(queue.send_calls(), 2);
}

#[tokio::test]
async fn different_content_same_name_stores_two_documents() {
    let store = FakeStore::new();
    let queue = FakeQueue::new();
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let a = submission();
    let mut b = submission();
    b.content = Bytes::from_static(b"9876543210");

    let first = coordinator.submit(&a, &fast_config()).await.unwrap();
    let second = coordinator.submit(&b, &fast_config()).await.unwrap();

    assert!(matches!(first, SubmissionOutcome::Accepted(_)));
    assert!(matches!(second, SubmissionOutcome::Accepted(_)));
    assert_eq!(store.stored_keys("documents/").len(), 2);
}

#[tokio::test]
async fn invalid_submission_performs_no_io() {
    let store = FakeStore::new();
    let queue = FakeQueue::new();
    let coordinator = Coordinator::new(store.clone(), queue.clone());

    let mut s = submission();
    s.document_type = None;

    let result = coordinator.submit(&s, &fast_config()).await;
    assert!(result.is_err());
    assert_eq!(store.put_calls(), 0);
    assert_eq!(queue.send_calls(), 0);
}

#[tokio::test]
async fn sweeper_redispatches_parked_orphans() {
    let store = FakeStore::new();
    let broken_queue =
        FakeQueue::with_send_script(vec![Err(NotifyError::Permanent("queue down".into()))]);
    let coordinator = Coordinator::new(store.clone(), broken_queue.clone());

    let s = submission();
    let outcome = coordinator.submit(&s, &fast_config()).await.unwrap();
    assert!(matches!(outcome, SubmissionOutcome::PartialSuccess { .. }));

    // Queue recovers; the sweeper drains the dead-letter prefix.
    let healthy_queue = FakeQueue::new();
    let sweeper = OrphanSweeper::new(store.clone(), healthy_queue.clone(), "dead-letter");
    let report = sweeper.sweep().await;

    assert_eq!(report.redispatched, 1);
    assert_eq!(report.remaining, 0);
    assert_eq!(report.skipped, 0);
    assert!(store.stored_keys("dead-letter/").is_empty(), "marker deleted");

    let sent = healthy_queue.sent();
    assert_eq!(sent.len(), 1);
    let notification: Notification = serde_json::from_str(&sent[0]).unwrap();
    assert_eq!(notification.correlation_id, s.correlation_id);
}

#[tokio::test]
async fn sweeper_keeps_markers_it_cannot_deliver_or_parse() {
    let store = FakeStore::new();
    store
        .put(
            "dead-letter/garbage.json",
            Bytes::from_static(b"not json"),
            "application/json",
            &AttributeSet::new(),
        )
        .await
        .unwrap();

    let queue = FakeQueue::new();
    let sweeper = OrphanSweeper::new(store.clone(), queue.clone(), "dead-letter");
    let report = sweeper.sweep().await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.redispatched, 0);
    assert_eq!(queue.send_calls(), 0);
    assert_eq!(
        store.stored_keys("dead-letter/"),
        vec!["dead-letter/garbage.json".to_string()],
        "unparseable markers are never deleted"
    );
}
