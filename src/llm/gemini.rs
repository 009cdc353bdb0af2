//! Google Gemini `generateContent` client.
//!
//! See: <https://ai.google.dev/api/generate-content>
//!
//! Every request enables the Google Search grounding tool so the model can
//! look up recent events on its own.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{ChatModel, Turn, TurnRole};
use crate::realtime::fetch::client_with_timeout;
use crate::telemetry;
use crate::{PlenarioError, Result};

/// Default base URL for the Generative Language API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 1024;

/// Client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: client_with_timeout(Duration::from_secs(60)),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Use a different model id.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overall request timeout. Default: 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http = client_with_timeout(timeout);
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, turns: &[Turn]) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest::new(turns))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => PlenarioError::AuthenticationFailed,
                429 => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .map(Duration::from_secs);
                    PlenarioError::RateLimited { retry_after }
                }
                code => {
                    let body = response.text().await.unwrap_or_default();
                    PlenarioError::Api {
                        status: code,
                        message: truncate_body(body),
                    }
                }
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(PlenarioError::EmptyResponse)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(name = "gemini.complete", skip(self, turns), fields(model = %self.model, turns = turns.len()))]
    async fn complete(&self, turns: &[Turn]) -> Result<String> {
        let start = Instant::now();
        let result = self.generate(turns).await;

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::LLM_REQUESTS_TOTAL,
            "provider" => "gemini",
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::LLM_REQUEST_DURATION_SECONDS, "provider" => "gemini")
            .record(start.elapsed().as_secs_f64());

        match &result {
            Ok(text) => debug!(chars = text.len(), "gemini reply received"),
            Err(e) => warn!(error = %e, "gemini request failed"),
        }
        result
    }
}

fn truncate_body(body: String) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body,
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: [Tool; 1],
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn new(turns: &'a [Turn]) -> Self {
        Self {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role,
                    parts: [Part { text: &turn.text }],
                })
                .collect(),
            tools: [Tool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
            },
        }
    }
}

#[derive(Serialize)]
struct Content<'a> {
    role: TurnRole,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, newline-joined. `None` when empty.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        (!text.is_empty()).then_some(text)
    }
}
