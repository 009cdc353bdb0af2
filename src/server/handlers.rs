//! Route handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use super::AppState;
use super::error::ApiError;
use crate::catalog::{self, SourceLink};
use crate::types::{ChatReply, ChatRequest, SurveyResponse, SurveySubmission};

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: String,
    pub uptime_secs: u64,
    pub cache: CacheInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub size: usize,
    pub max_age_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub timestamp: String,
    pub sources: BTreeMap<&'static str, Vec<SourceLink>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheClearResponse {
    pub message: &'static str,
    pub before_size: usize,
    pub after_size: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SurveyListResponse {
    pub responses: Vec<SurveyResponse>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let reply = state.chat.chat(&request).await.map_err(ApiError::from_chat)?;
    Ok(Json(reply))
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.chat.cache();
    Json(HealthResponse {
        status: "ok",
        timestamp: now_rfc3339(),
        version: crate::version_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        cache: CacheInfo {
            size: cache.len(),
            max_age_secs: cache.max_age().as_secs(),
        },
    })
}

/// `GET /api/sources`
pub async fn sources() -> Json<SourcesResponse> {
    Json(SourcesResponse {
        timestamp: now_rfc3339(),
        sources: catalog::official_sources(),
    })
}

/// `POST /api/cache/clear`
pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let cache = state.chat.cache();
    let before_size = cache.clear();
    Json(CacheClearResponse {
        message: "Cache limpo com sucesso",
        before_size,
        after_size: cache.len(),
        timestamp: now_rfc3339(),
    })
}

/// `POST /api/nps/responses`
pub async fn submit_survey(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SurveyResponse>), ApiError> {
    let entry = SurveySubmission::from_json(&body)
        .and_then(SurveySubmission::into_response)
        .map_err(ApiError::from_store)?;

    state
        .store
        .add(entry.clone())
        .await
        .map_err(ApiError::from_store)?;

    info!(
        score = entry.score,
        classification = %entry.classification,
        backend = state.store.backend(),
        "survey response accepted"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /api/nps/responses`
pub async fn list_surveys(
    State(state): State<AppState>,
) -> Result<Json<SurveyListResponse>, ApiError> {
    let responses = state.store.list().await.map_err(ApiError::from_store)?;
    Ok(Json(SurveyListResponse { responses }))
}
