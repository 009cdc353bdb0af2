//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::{Value, json};

use plenario::llm::{ChatModel, Turn};
use plenario::realtime::{JsonFetcher, RealTimeAggregator, RealTimeConfig};
use plenario::store::{FileResponseStore, ResponseStore};
use plenario::telemetry;
use plenario::types::SurveyResponse;
use plenario::{
    CacheConfig, ChatRequest, ChatService, PlenarioError, ResponseCache, Result,
};

// ============================================================================
// Mocks
// ============================================================================

struct EchoModel;

#[async_trait]
impl ChatModel for EchoModel {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, turns: &[Turn]) -> Result<String> {
        Ok(turns.last().map(|t| t.text.clone()).unwrap_or_default())
    }
}

/// Câmara answers, Senado fails.
struct HalfDownFetcher;

#[async_trait]
impl JsonFetcher for HalfDownFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        if url.contains("senado") {
            Err(PlenarioError::Http("connection reset".into()))
        } else {
            Ok(json!({ "dados": [{ "nome": "Fulano" }] }))
        }
    }
}

fn aggregator() -> Arc<RealTimeAggregator> {
    Arc::new(RealTimeAggregator::with_fetcher(
        Arc::new(HalfDownFetcher),
        RealTimeConfig::default(),
    ))
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    counter_where(snapshot, name, |_| true)
}

/// Sum counter values for `name` whose labels include `label = value`.
fn counter_labelled(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    counter_where(snapshot, name, |key| {
        key.key()
            .labels()
            .any(|l| l.key() == label && l.value() == value)
    })
}

fn counter_where(
    snapshot: &SnapshotVec,
    name: &str,
    keep: impl Fn(&metrics_util::CompositeKey) -> bool,
) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| keep(key))
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn cache_hits_and_misses_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let chat = ChatService::new(
                    Arc::new(ResponseCache::new(&CacheConfig::default())),
                    aggregator(),
                    Arc::new(EchoModel),
                );
                let request = ChatRequest::new("O que é federalismo?");
                chat.chat(&request).await.unwrap();
                chat.chat(&request).await.unwrap();
                chat.chat(&request).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn realtime_fetches_record_status_and_duration() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let bundle = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                aggregator().fetch("deputados no senado").await
            })
        })
    });
    assert_eq!(bundle.result_count(), 1);

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::REALTIME_FETCHES_TOTAL), 2);
    assert_eq!(
        counter_labelled(&snapshot, telemetry::REALTIME_FETCHES_TOTAL, "status", "ok"),
        1
    );
    assert_eq!(
        counter_labelled(&snapshot, telemetry::REALTIME_FETCHES_TOTAL, "status", "error"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::REALTIME_FETCH_DURATION_SECONDS),
        "expected a fetch duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn survey_writes_are_counted_per_backend() {
    let dir = tempfile::TempDir::new().unwrap();
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let store = FileResponseStore::open(dir.path().join("nps.json")).unwrap();
                for score in [0, 7, 10] {
                    store
                        .add(SurveyResponse::new(score, Utc::now()).unwrap())
                        .await
                        .unwrap();
                }
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_labelled(&snapshot, telemetry::SURVEY_WRITES_TOTAL, "backend", "file"),
        3
    );
    assert_eq!(
        counter_labelled(&snapshot, telemetry::SURVEY_WRITES_TOTAL, "status", "error"),
        0
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let chat = ChatService::new(
        Arc::new(ResponseCache::new(&CacheConfig::default())),
        aggregator(),
        Arc::new(EchoModel),
    );
    chat.chat(&ChatRequest::new("Quem são os deputados?"))
        .await
        .unwrap();
}
