//! Real-time public data aggregation.
//!
//! [`RealTimeAggregator::fetch`] consults a fixed, ordered set of sources
//! and returns a [`RealTimeBundle`]. It never fails: a source that errors,
//! times out, or returns no items simply contributes nothing.
//!
//! Source order in the bundle is fixed (Câmara proposições, Câmara
//! deputados, Senado, TSE, Planalto) regardless of which request finishes
//! first. The three network sources run concurrently, each bounded by
//! [`RealTimeConfig::timeout`].

pub mod fetch;
mod sources;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Local};
use tracing::{debug, info, instrument, warn};

pub use fetch::{HttpJsonFetcher, JsonFetcher};
use sources::{Api, LiveSource};

use crate::telemetry;
use crate::types::{RealTimeBundle, RealTimeResult};

/// Default Câmara dos Deputados open-data API.
pub const DEFAULT_CAMARA_BASE_URL: &str = "https://dadosabertos.camara.leg.br/api/v2";

/// Default Senado Federal open-data API.
pub const DEFAULT_SENADO_BASE_URL: &str = "https://legis.senado.leg.br/dadosabertos";

/// Terms that make a question worth augmenting with live data.
const AUGMENTATION_KEYWORDS: &[&str] = &[
    "eleições", "resultados", "votação", "candidatos", "tse",
    "tramitação", "projetos", "projeto", "proposição", "proposições",
    "leis", "lei", "decreto", "decretos", "sanção", "sancionado", "sancionou",
    "câmara", "senado", "deputado", "deputados", "senador", "senadores",
    "atual", "recente", "hoje", "agora", "último", "última", "últimos",
    "plenário", "comissão", "sessão", "reunião", "aprovação", "aprovado",
    "orçamento", "pib", "inflação", "economia", "política", "governo",
    "presidente", "ministro", "ministério", "pasta",
];

/// Whether `query` mentions any augmentation keyword (case-insensitive substring).
///
/// ```rust
/// use plenario::realtime::needs_augmentation;
///
/// assert!(needs_augmentation("Qual a inflação HOJE?"));
/// assert!(!needs_augmentation("Explique o que é federalismo"));
/// ```
pub fn needs_augmentation(query: &str) -> bool {
    let lower = query.to_lowercase();
    AUGMENTATION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Endpoints and limits for the aggregator.
#[derive(Debug, Clone)]
pub struct RealTimeConfig {
    pub camara_base_url: String,
    pub senado_base_url: String,
    /// Upper bound for each network source. Default: 5 seconds.
    pub timeout: Duration,
}

impl Default for RealTimeConfig {
    fn default() -> Self {
        Self {
            camara_base_url: DEFAULT_CAMARA_BASE_URL.to_string(),
            senado_base_url: DEFAULT_SENADO_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl RealTimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camara_base_url(mut self, url: impl Into<String>) -> Self {
        self.camara_base_url = url.into();
        self
    }

    pub fn senado_base_url(mut self, url: impl Into<String>) -> Self {
        self.senado_base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn base_for(&self, api: Api) -> &str {
        match api {
            Api::Camara => &self.camara_base_url,
            Api::Senado => &self.senado_base_url,
        }
    }
}

/// Gathers live data from Brazilian government sources.
pub struct RealTimeAggregator {
    fetcher: Arc<dyn JsonFetcher>,
    config: RealTimeConfig,
}

impl RealTimeAggregator {
    /// Aggregator using [`HttpJsonFetcher`] bounded by the configured timeout.
    pub fn new(config: RealTimeConfig) -> Self {
        let fetcher = Arc::new(HttpJsonFetcher::new(config.timeout));
        Self::with_fetcher(fetcher, config)
    }

    /// Aggregator with a custom network layer.
    pub fn with_fetcher(fetcher: Arc<dyn JsonFetcher>, config: RealTimeConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &RealTimeConfig {
        &self.config
    }

    /// See [`needs_augmentation`].
    pub fn needs_augmentation(&self, query: &str) -> bool {
        needs_augmentation(query)
    }

    /// Collect live data relevant to `query`, stamped with the local time.
    pub async fn fetch(&self, query: &str) -> RealTimeBundle {
        self.fetch_at(query, Local::now()).await
    }

    /// Like [`fetch`](Self::fetch) with an explicit clock reading.
    ///
    /// The year used in source URLs and notes is taken from `now`.
    #[instrument(name = "realtime.fetch", skip(self, query, now))]
    pub async fn fetch_at(&self, query: &str, now: DateTime<Local>) -> RealTimeBundle {
        let lower = query.to_lowercase();
        let year = now.year();

        let (proposicoes, deputados, senadores) = tokio::join!(
            self.fetch_live(&sources::CAMARA_PROPOSICOES, &lower, year),
            self.fetch_live(&sources::CAMARA_DEPUTADOS, &lower, year),
            self.fetch_live(&sources::SENADO_SENADORES, &lower, year),
        );

        let results: Vec<RealTimeResult> = [
            proposicoes,
            deputados,
            senadores,
            sources::tse_note(&lower),
            sources::planalto_note(&lower, year),
        ]
        .into_iter()
        .flatten()
        .collect();

        info!(results = results.len(), "real-time bundle assembled");
        RealTimeBundle::new(results, now)
    }

    async fn fetch_live(&self, source: &LiveSource, lower: &str, year: i32) -> Option<RealTimeResult> {
        if !source.matches(lower) {
            return None;
        }

        let url = source.url(self.config.base_for(source.api), year);
        let start = Instant::now();
        let outcome = tokio::time::timeout(self.config.timeout, self.fetcher.get_json(&url)).await;

        let (status, result) = match outcome {
            Err(_) => {
                warn!(
                    source = source.name,
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "real-time source timed out"
                );
                ("timeout", None)
            }
            Ok(Err(e)) => {
                warn!(source = source.name, error = %e, "real-time source failed");
                ("error", None)
            }
            Ok(Ok(body)) => match source.extract(&body) {
                Some(items) => {
                    debug!(source = source.name, items = items.len(), "real-time source ok");
                    ("ok", Some(source.result(items)))
                }
                None => {
                    debug!(source = source.name, "real-time source returned no items");
                    ("empty", None)
                }
            },
        };

        metrics::counter!(telemetry::REALTIME_FETCHES_TOTAL,
            "source" => source.name,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REALTIME_FETCH_DURATION_SECONDS, "source" => source.name)
            .record(start.elapsed().as_secs_f64());

        result
    }
}
