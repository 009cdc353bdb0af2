//! Real-time data bundle types.
//!
//! Wire field names are the Portuguese ones the frontend and the prompt
//! renderer expect (`fonte`, `tipo`, `dados`, ...).

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use serde_json::Value;

/// Observation used when at least one source produced data.
pub const NOTE_LIVE_DATA: &str = "Dados buscados em tempo real de fontes oficiais";

/// Observation used when every source was skipped or failed.
pub const NOTE_NO_LIVE_DATA: &str = "Consulte os sites oficiais para informações mais detalhadas";

/// Display format shared by bundles and chat replies (`"05 de May de 2025 às 14:03"`).
pub const DISPLAY_FORMAT: &str = "%d de %B de %Y às %H:%M";

/// Contribution of a single source to a [`RealTimeBundle`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealTimeResult {
    #[serde(rename = "fonte")]
    pub source: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    /// Truncated upstream items; never the full upstream payload.
    #[serde(rename = "dados", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<Value>>,
    #[serde(rename = "nota", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "url", skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

impl RealTimeResult {
    /// A result carrying upstream items.
    pub fn with_items(
        source: impl Into<String>,
        kind: impl Into<String>,
        items: Vec<Value>,
        reference_url: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            kind: kind.into(),
            payload: Some(items),
            note: None,
            reference_url: Some(reference_url.into()),
        }
    }

    /// A static informational result with no network payload.
    pub fn with_note(
        source: impl Into<String>,
        kind: impl Into<String>,
        note: impl Into<String>,
        reference_url: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            kind: kind.into(),
            payload: None,
            note: Some(note.into()),
            reference_url: Some(reference_url.into()),
        }
    }
}

/// Aggregated real-time data for one request.
///
/// Fields are private so that `total` always equals the number of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealTimeBundle {
    #[serde(rename = "lastUpdate")]
    generated_at: String,
    #[serde(rename = "timestamp")]
    generated_at_display: String,
    #[serde(rename = "resultados")]
    results: Vec<RealTimeResult>,
    #[serde(rename = "total")]
    result_count: usize,
    #[serde(rename = "observacao")]
    note: String,
}

impl RealTimeBundle {
    /// Assemble a bundle; `results` must already be in source order.
    pub fn new(results: Vec<RealTimeResult>, generated: DateTime<Local>) -> Self {
        let note = if results.is_empty() {
            NOTE_NO_LIVE_DATA
        } else {
            NOTE_LIVE_DATA
        };
        Self {
            generated_at: generated.to_rfc3339_opts(SecondsFormat::Secs, false),
            generated_at_display: generated.format(DISPLAY_FORMAT).to_string(),
            result_count: results.len(),
            results,
            note: note.to_string(),
        }
    }

    /// Machine-parseable generation time (RFC 3339).
    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }

    /// Human-readable generation time.
    pub fn generated_at_display(&self) -> &str {
        &self.generated_at_display
    }

    pub fn results(&self) -> &[RealTimeResult] {
        &self.results
    }

    pub fn result_count(&self) -> usize {
        self.result_count
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Observation describing whether any live data was obtained.
    pub fn note(&self) -> &str {
        &self.note
    }
}
