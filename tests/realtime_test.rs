//! Tests for [`RealTimeAggregator`]: gating, ordering, failure isolation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plenario::realtime::{JsonFetcher, RealTimeAggregator, RealTimeConfig};
use plenario::types::realtime::{NOTE_LIVE_DATA, NOTE_NO_LIVE_DATA};
use plenario::{PlenarioError, Result};

fn config_for(server: &MockServer) -> RealTimeConfig {
    RealTimeConfig::new()
        .camara_base_url(format!("{}/api/v2", server.uri()))
        .senado_base_url(format!("{}/dadosabertos", server.uri()))
        .timeout(Duration::from_secs(2))
}

fn fixed_now() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 0).unwrap()
}

fn dados(n: usize) -> Value {
    let items: Vec<Value> = (0..n)
        .map(|i| json!({ "id": i, "nome": format!("Item {i}"), "siglaPartido": "XX" }))
        .collect();
    json!({ "dados": items, "links": [] })
}

async fn mount_all(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2/proposicoes"))
        .and(query_param("ano", "2026"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dados(10)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/deputados"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dados(10)))
        .mount(server)
        .await;
    let senadores: Vec<Value> = (0..15).map(|i| json!({ "CodigoParlamentar": i })).collect();
    Mock::given(method("GET"))
        .and(path("/dadosabertos/senador/lista/atual"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ListaParlamentarEmExercicio": { "Parlamentares": { "Parlamentar": senadores } }
        })))
        .mount(server)
        .await;
}

/// Counts calls and answers every URL with the same body.
struct CountingFetcher {
    calls: AtomicUsize,
    body: Value,
}

#[async_trait]
impl JsonFetcher for CountingFetcher {
    async fn get_json(&self, _url: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

/// Never answers.
struct StallingFetcher;

#[async_trait]
impl JsonFetcher for StallingFetcher {
    async fn get_json(&self, _url: &str) -> Result<Value> {
        std::future::pending().await
    }
}

/// Fails for Câmara URLs, stalls for nothing.
struct CamaraDownFetcher {
    senado_body: Value,
}

#[async_trait]
impl JsonFetcher for CamaraDownFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        if url.contains("camara") {
            Err(PlenarioError::Http("connection refused".into()))
        } else {
            Ok(self.senado_body.clone())
        }
    }
}

#[tokio::test]
async fn all_sources_in_fixed_order() {
    let server = MockServer::start().await;
    mount_all(&server).await;
    let aggregator = RealTimeAggregator::new(config_for(&server));

    let bundle = aggregator
        .fetch_at(
            "projeto de lei sobre eleições no senado e deputados",
            fixed_now(),
        )
        .await;

    let sources: Vec<(&str, &str)> = bundle
        .results()
        .iter()
        .map(|r| (r.source.as_str(), r.kind.as_str()))
        .collect();
    assert_eq!(
        sources,
        vec![
            ("Câmara dos Deputados", "proposições"),
            ("Câmara dos Deputados", "deputados"),
            ("Senado Federal", "senadores"),
            ("TSE - Tribunal Superior Eleitoral", "informações eleitorais"),
            ("Planalto", "legislação"),
        ]
    );
    assert_eq!(bundle.result_count(), 5);
    assert_eq!(bundle.note(), NOTE_LIVE_DATA);
    assert_eq!(bundle.generated_at_display(), "09 de March de 2026 às 14:05");
}

#[tokio::test]
async fn items_are_capped_per_source() {
    let server = MockServer::start().await;
    mount_all(&server).await;
    let aggregator = RealTimeAggregator::new(config_for(&server));

    let bundle = aggregator
        .fetch_at("tramitação de proposições e senadores", fixed_now())
        .await;

    let results = bundle.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].payload.as_ref().unwrap().len(), 5);
    assert_eq!(results[1].payload.as_ref().unwrap().len(), 10);
    assert_eq!(
        results[1].reference_url.as_deref(),
        Some("https://www25.senado.leg.br/")
    );
}

#[tokio::test]
async fn upstream_error_contributes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let aggregator = RealTimeAggregator::new(config_for(&server));

    let bundle = aggregator.fetch_at("deputados e senadores", fixed_now()).await;
    assert!(bundle.is_empty());
    assert_eq!(bundle.note(), NOTE_NO_LIVE_DATA);
}

#[tokio::test]
async fn empty_upstream_list_contributes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/deputados"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dados(0)))
        .mount(&server)
        .await;
    let aggregator = RealTimeAggregator::new(config_for(&server));

    let bundle = aggregator.fetch_at("deputados", fixed_now()).await;
    assert!(bundle.is_empty());
}

#[tokio::test]
async fn failing_source_does_not_affect_others() {
    let fetcher = Arc::new(CamaraDownFetcher {
        senado_body: json!({
            "ListaParlamentarEmExercicio": { "Parlamentar": [{ "CodigoParlamentar": 1 }] }
        }),
    });
    let aggregator = RealTimeAggregator::with_fetcher(fetcher, RealTimeConfig::default());

    let bundle = aggregator
        .fetch_at("projeto de deputado aprovado no senado", fixed_now())
        .await;
    assert_eq!(bundle.result_count(), 1);
    assert_eq!(bundle.results()[0].source, "Senado Federal");
}

#[tokio::test(start_paused = true)]
async fn stalled_sources_time_out_to_empty_bundle() {
    let aggregator = RealTimeAggregator::with_fetcher(
        Arc::new(StallingFetcher),
        RealTimeConfig::default().timeout(Duration::from_millis(50)),
    );

    let bundle = aggregator
        .fetch_at("projeto de deputado no senado", fixed_now())
        .await;
    assert!(bundle.is_empty());
    assert_eq!(bundle.result_count(), 0);
    assert_eq!(bundle.note(), NOTE_NO_LIVE_DATA);
}

#[tokio::test]
async fn unrelated_query_makes_no_requests() {
    let fetcher = Arc::new(CountingFetcher {
        calls: AtomicUsize::new(0),
        body: dados(3),
    });
    let aggregator = RealTimeAggregator::with_fetcher(fetcher.clone(), RealTimeConfig::default());

    let bundle = aggregator.fetch_at("o que é federalismo?", fixed_now()).await;
    assert!(bundle.is_empty());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn senador_alone_triggers_senado_only() {
    let fetcher = Arc::new(CountingFetcher {
        calls: AtomicUsize::new(0),
        body: json!({
            "ListaParlamentarEmExercicio": { "Parlamentar": [{ "CodigoParlamentar": 1 }] }
        }),
    });
    let aggregator = RealTimeAggregator::with_fetcher(fetcher.clone(), RealTimeConfig::default());

    let bundle = aggregator.fetch_at("quem é o senador?", fixed_now()).await;
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(bundle.result_count(), 1);
    assert_eq!(bundle.results()[0].kind, "senadores");
}

#[tokio::test]
async fn static_notes_need_no_network() {
    let fetcher = Arc::new(CountingFetcher {
        calls: AtomicUsize::new(0),
        body: Value::Null,
    });
    let aggregator = RealTimeAggregator::with_fetcher(fetcher.clone(), RealTimeConfig::default());

    let bundle = aggregator
        .fetch_at("novo decreto sobre votação", fixed_now())
        .await;
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    let kinds: Vec<&str> = bundle.results().iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(kinds, vec!["informações eleitorais", "legislação"]);
    assert!(bundle.results().iter().all(|r| r.payload.is_none()));
}
