//! Telemetry metric name constants.
//!
//! Centralised metric names for plenario operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `plenario_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `source`: real-time data source (e.g. "camara_proposicoes")
//! - `status`: outcome: "ok", "empty", "error" or "timeout"
//! - `backend`: survey store backend: "file" or "firestore"

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "plenario_cache_hits_total";

/// Total response cache misses (absent or expired).
pub const CACHE_MISSES_TOTAL: &str = "plenario_cache_misses_total";

/// Total real-time source lookups.
///
/// Labels: `source`, `status` ("ok" | "empty" | "error" | "timeout").
pub const REALTIME_FETCHES_TOTAL: &str = "plenario_realtime_fetches_total";

/// Real-time source lookup duration in seconds.
///
/// Labels: `source`.
pub const REALTIME_FETCH_DURATION_SECONDS: &str = "plenario_realtime_fetch_duration_seconds";

/// Total LLM completion requests.
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const LLM_REQUESTS_TOTAL: &str = "plenario_llm_requests_total";

/// LLM completion duration in seconds.
///
/// Labels: `provider`.
pub const LLM_REQUEST_DURATION_SECONDS: &str = "plenario_llm_request_duration_seconds";

/// Total survey responses written.
///
/// Labels: `backend`, `status` ("ok" | "error").
pub const SURVEY_WRITES_TOTAL: &str = "plenario_survey_writes_total";

/// Total stored survey records skipped while listing because they could not be decoded.
///
/// Labels: `backend`.
pub const SURVEY_SKIPPED_TOTAL: &str = "plenario_survey_skipped_total";
