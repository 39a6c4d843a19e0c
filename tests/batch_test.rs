//! Batch pipeline tests with scripted drug sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use eir::{CanonicalName, DrugGateway, DrugRecord, DrugSource, Eir, EirError, Result};
use tempfile::{TempDir, tempdir};

// ============================================================================
// Scripted source
// ============================================================================

/// Source that answers from a script: named failures, optional latency, and
/// a total fetch counter.
struct ScriptedSource {
    failing: Vec<String>,
    delay: Option<Duration>,
    call_count: AtomicU32,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            failing: Vec::new(),
            delay: None,
            call_count: AtomicU32::new(0),
        }
    }

    fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DrugSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, name: &CanonicalName) -> Result<DrugRecord> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.iter().any(|f| f == name.as_str()) {
            return Err(EirError::Api {
                status: 500,
                message: format!("scripted failure for {name}"),
            });
        }
        Ok(DrugRecord {
            category: "Test Category".to_string(),
            ..DrugRecord::new(name.as_str(), "scripted")
        })
    }
}

fn gateway(source: Arc<dyn DrugSource>, dir: &TempDir, names: &[&str]) -> DrugGateway {
    Eir::builder()
        .source(source)
        .cache_path(dir.path().join("cache.json"))
        .reference_names(names.iter().copied())
        .build()
        .expect("gateway should build")
}

// ============================================================================
// Ordering and deduplication
// ============================================================================

/// Output position `i` answers `queries[i]`, and duplicates within a batch
/// share one fetch.
#[tokio::test]
async fn results_preserve_input_order() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = gateway(source.clone(), &dir, &["alpha", "beta", "gamma"]);

    let queries = ["beta", "alpha", "alpha", "gamma"];
    let results = gateway.resolve_batch(&queries).await;

    assert_eq!(results.len(), queries.len());
    for (query, result) in queries.iter().zip(&results) {
        let record = result.as_ref().expect("all queries should resolve");
        assert_eq!(record.name, *query);
    }
    assert_eq!(source.calls(), 3, "three distinct names, three fetches");
}

#[tokio::test]
async fn duplicate_queries_share_one_fetch() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = gateway(source.clone(), &dir, &["aspirin"]);

    let results = gateway.resolve_batch(&["aspirin", "aspirin", "aspirin"]).await;

    assert_eq!(source.calls(), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), first);
    }
}

#[tokio::test]
async fn empty_batch_returns_empty() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = gateway(source.clone(), &dir, &["aspirin"]);

    assert!(gateway.resolve_batch(&[]).await.is_empty());
    assert_eq!(source.calls(), 0);
}

// ============================================================================
// Failure isolation
// ============================================================================

/// One failing lookup never poisons its neighbours.
#[tokio::test]
async fn failure_is_isolated_to_its_slot() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new().failing("broken"));
    let gateway = gateway(source, &dir, &["broken", "working"]);

    let results = gateway.resolve_batch(&["broken", "working"]).await;

    assert!(
        matches!(results[0], Err(EirError::Api { status: 500, .. })),
        "expected scripted failure, got {:?}",
        results[0]
    );
    let record = results[1]
        .as_ref()
        .expect("an isolated failure must not spill over");
    assert_eq!(record.name, "working");
}

#[tokio::test]
async fn unresolved_query_fails_in_place() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = gateway(source.clone(), &dir, &["aspirin"]);

    let results = gateway.resolve_batch(&["aspirin", "zzzzzz"]).await;

    assert!(results[0].is_ok());
    match &results[1] {
        Err(EirError::Unresolved(query)) => assert_eq!(query, "zzzzzz"),
        other => panic!("expected Unresolved, got {other:?}"),
    }
    assert_eq!(source.calls(), 1, "unresolved queries are never dispatched");
}

#[tokio::test]
async fn slow_fetch_times_out() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new().delay(Duration::from_millis(200)));
    let gateway = Eir::builder()
        .source(source)
        .cache_path(dir.path().join("cache.json"))
        .reference_names(["slowpoke"])
        .fetch_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let results = gateway.resolve_batch(&["slowpoke"]).await;

    match &results[0] {
        Err(EirError::Timeout(timeout)) => assert_eq!(*timeout, Duration::from_millis(50)),
        other => panic!("expected Timeout, got {other:?}"),
    }
    let stats = gateway.cache().stats().await;
    assert_eq!(stats.disk_entries, 0, "timed-out lookups are not cached");
}

// ============================================================================
// Cache interaction
// ============================================================================

#[tokio::test]
async fn second_batch_served_from_cache() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = gateway(source.clone(), &dir, &["aspirin"]);

    let first = gateway.resolve_batch(&["aspirin"]).await;
    assert_eq!(source.calls(), 1);

    let second = gateway.resolve_batch(&["aspirin"]).await;
    assert_eq!(source.calls(), 1, "second batch should hit the cache");
    assert_eq!(
        first[0].as_ref().unwrap(),
        second[0].as_ref().unwrap(),
        "cache must hand back the fetched record"
    );
}

#[tokio::test]
async fn fetched_records_persist_to_disk() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = gateway(source, &dir, &["metformin"]);

    gateway.resolve_batch(&["metformin"]).await;

    let stats = gateway.cache().stats().await;
    assert_eq!(stats.memory_entries, 1);
    assert_eq!(stats.disk_entries, 1);
}

#[tokio::test]
async fn failed_fetch_is_not_cached() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new().failing("broken"));
    let gateway = gateway(source.clone(), &dir, &["broken"]);

    let first = gateway.resolve_batch(&["broken"]).await;
    assert!(first[0].is_err());
    assert_eq!(gateway.cache().stats().await.disk_entries, 0);

    let second = gateway.resolve_batch(&["broken"]).await;
    assert!(second[0].is_err());
    assert_eq!(source.calls(), 2, "failures are retried on the next batch");
}

// ============================================================================
// End to end
// ============================================================================

/// A misspelled query resolves against the built-in lexicon and the source
/// sees the canonical name.
#[tokio::test]
async fn typo_resolves_to_canonical_name_before_fetch() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = Eir::builder()
        .source(source)
        .cache_path(dir.path().join("cache.json"))
        .build()
        .unwrap();

    let results = gateway.resolve_batch(&["amlodipin"]).await;

    let record = results[0].as_ref().expect("typo should resolve");
    assert_eq!(record.name, "amlodipine");
}

#[tokio::test]
async fn lookup_is_one_element_batch() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = gateway(source, &dir, &["aspirin"]);

    let record = gateway.lookup("aspirin").await.expect("lookup should succeed");
    assert_eq!(record.name, "aspirin");

    match gateway.lookup("qqqqqq").await {
        Err(EirError::Unresolved(query)) => assert_eq!(query, "qqqqqq"),
        other => panic!("expected Unresolved, got {other:?}"),
    }
}

#[tokio::test]
async fn detected_conditions_from_batch_results() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let gateway = gateway(source, &dir, &["metformin", "glimepiride"]);

    let results = gateway.resolve_batch(&["metformin", "glimepiride"]).await;
    let names: Vec<CanonicalName> = results
        .iter()
        .flatten()
        .map(|record| CanonicalName::new(&record.name))
        .collect();

    let conditions = eir::detect_conditions(&names);
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].condition, "Type 2 Diabetes (Moderate to Severe)");
}
