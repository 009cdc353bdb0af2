//! plenariod: Plenário chatbot daemon.
//!
//! Serves the chat relay, the source catalog and the NPS survey API over
//! HTTP, optionally together with the built frontend.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use plenario::llm::GeminiClient;
use plenario::realtime::RealTimeAggregator;
use plenario::server::config::{Config, Secrets, SurveyBackend};
use plenario::server::{AppState, router};
use plenario::store::{FileResponseStore, ResponseStore};
use plenario::{ChatService, PlenarioError, ResponseCache};

/// Plenário daemon: civic chatbot backend.
#[derive(Parser)]
#[command(name = "plenariod")]
#[command(version = plenario::PKG_VERSION)]
#[command(about = "Plenário civic chatbot backend")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Default: info for our crate and request traces; override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("plenario=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let model = build_model(&config, &secrets)?;
    let store = build_store(&config, &secrets)?;

    let cache = Arc::new(ResponseCache::new(&config.cache.to_cache_config()));
    let aggregator = Arc::new(RealTimeAggregator::new(
        config.realtime.to_realtime_config(),
    ));
    let chat = Arc::new(ChatService::new(cache, aggregator, model));

    let addr: SocketAddr = config.server.address.parse().map_err(|e| {
        PlenarioError::Configuration(format!("Invalid address {:?}: {e}", config.server.address))
    })?;

    let app = router(
        AppState::new(chat, Arc::clone(&store)),
        config.server.static_dir.clone(),
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        version = plenario::version_string(),
        %addr,
        survey_backend = store.backend(),
        "plenariod starting"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await?;
    info!("plenariod stopped");
    Ok(())
}

fn build_model(config: &Config, secrets: &Secrets) -> Result<Arc<GeminiClient>, PlenarioError> {
    let api_key = secrets.gemini_api_key().ok_or_else(|| {
        PlenarioError::Configuration(
            "Gemini API key missing: set [gemini] api_key in secrets.toml or GEMINI_API_KEY".into(),
        )
    })?;

    let mut client = match &config.llm.base_url {
        Some(base) => GeminiClient::with_base_url(api_key, base),
        None => GeminiClient::new(api_key),
    };
    if let Some(model) = &config.llm.model {
        client = client.model(model);
    }
    if let Some(secs) = config.llm.timeout_secs {
        client = client.timeout(std::time::Duration::from_secs(secs));
    }
    Ok(Arc::new(client))
}

fn build_store(
    config: &Config,
    secrets: &Secrets,
) -> Result<Arc<dyn ResponseStore>, PlenarioError> {
    match config.survey.backend {
        SurveyBackend::File => Ok(Arc::new(FileResponseStore::open(&config.survey.path)?)),
        SurveyBackend::Firestore => build_firestore_store(config, secrets),
    }
}

#[cfg(feature = "firestore")]
fn build_firestore_store(
    config: &Config,
    secrets: &Secrets,
) -> Result<Arc<dyn ResponseStore>, PlenarioError> {
    use plenario::store::{FirestoreClient, RemoteResponseStore};

    let project_id = config.survey.project_id.clone().ok_or_else(|| {
        PlenarioError::Configuration("[survey] project_id is required for firestore".into())
    })?;
    let token = secrets.firestore_access_token().ok_or_else(|| {
        PlenarioError::Configuration(
            "Firestore token missing: set [firestore] access_token in secrets.toml or FIRESTORE_ACCESS_TOKEN"
                .into(),
        )
    })?;

    Ok(Arc::new(RemoteResponseStore::with_collection(
        FirestoreClient::new(project_id, token),
        config.survey.collection.clone(),
    )))
}

#[cfg(not(feature = "firestore"))]
fn build_firestore_store(
    _config: &Config,
    _secrets: &Secrets,
) -> Result<Arc<dyn ResponseStore>, PlenarioError> {
    Err(PlenarioError::Configuration(
        "firestore backend requested but plenariod was built without the `firestore` feature".into(),
    ))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
