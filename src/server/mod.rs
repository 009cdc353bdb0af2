//! HTTP API served by `plenariod`.
//!
//! | Method | Path                  | Handler                              |
//! |--------|-----------------------|--------------------------------------|
//! | POST   | `/api/chat`           | [`handlers::chat`]                   |
//! | GET    | `/api/health`         | [`handlers::health`]                 |
//! | GET    | `/api/sources`        | [`handlers::sources`]                |
//! | POST   | `/api/cache/clear`    | [`handlers::clear_cache`]            |
//! | POST   | `/api/nps/responses`  | [`handlers::submit_survey`]          |
//! | GET    | `/api/nps/responses`  | [`handlers::list_surveys`]           |
//!
//! Unmatched paths fall through to the static frontend directory when one
//! is configured.

pub mod config;
pub mod error;
pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::ChatService;
use crate::store::ResponseStore;

/// Largest accepted survey submission body.
pub const MAX_SURVEY_BODY: usize = 64 * 1024;

/// Shared application state.
///
/// Built once in `plenariod` and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub store: Arc<dyn ResponseStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(chat: Arc<ChatService>, store: Arc<dyn ResponseStore>) -> Self {
        Self {
            chat,
            store,
            started_at: Instant::now(),
        }
    }
}

/// Build the router with all API routes and middleware.
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let surveys = post(handlers::submit_survey)
        .layer(DefaultBodyLimit::max(MAX_SURVEY_BODY))
        .get(handlers::list_surveys);

    let mut app = Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/health", get(handlers::health))
        .route("/api/sources", get(handlers::sources))
        .route("/api/cache/clear", post(handlers::clear_cache))
        .route("/api/nps/responses", surveys)
        .with_state(state);

    if let Some(dir) = static_dir {
        // Client-side routes resolve to the SPA entry point.
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
