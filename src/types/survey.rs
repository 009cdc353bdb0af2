//! NPS survey records and submission validation.
//!
//! A [`SurveySubmission`] is the raw client payload. Converting it into a
//! [`SurveyResponse`] validates the score, recomputes the classification,
//! sanitises the reasons and normalises the submission timestamp. Only
//! `SurveyResponse` values ever reach a store.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{PlenarioError, Result};

/// Highest valid NPS score.
pub const MAX_SCORE: u8 = 10;

/// Maximum number of reasons kept per response.
pub const MAX_REASONS: usize = 5;

/// NPS bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Detractor,
    Neutral,
    Promoter,
}

impl Classification {
    /// 0–6 detractor, 7–8 neutral, 9–10 promoter.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=6 => Classification::Detractor,
            7 | 8 => Classification::Neutral,
            _ => Classification::Promoter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Detractor => "detractor",
            Classification::Neutral => "neutral",
            Classification::Promoter => "promoter",
        }
    }

    /// Parse a label, ignoring surrounding whitespace and case.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "detractor" => Some(Classification::Detractor),
            "neutral" => Some(Classification::Neutral),
            "promoter" => Some(Classification::Promoter),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accepted survey response. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub score: u8,
    pub classification: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub feedback: String,
    /// RFC 3339, UTC, second precision.
    pub submitted_at: String,
}

impl SurveyResponse {
    /// Build a response with the classification derived from `score`.
    ///
    /// Reasons and feedback go through the same sanitisation as client
    /// submissions.
    pub fn new(score: u8, submitted_at: DateTime<Utc>) -> Result<Self> {
        validate_score(i64::from(score))?;
        Ok(Self {
            score,
            classification: Classification::from_score(score),
            reasons: None,
            feedback: String::new(),
            submitted_at: format_timestamp(submitted_at),
        })
    }

    /// Score within range and classification derived from it.
    pub fn is_consistent(&self) -> bool {
        self.score <= MAX_SCORE && self.classification == Classification::from_score(self.score)
    }

    pub fn with_reasons<S: AsRef<str>>(mut self, reasons: &[S]) -> Self {
        self.reasons = sanitize_reasons(reasons);
        self
    }

    pub fn with_feedback(mut self, feedback: impl AsRef<str>) -> Self {
        self.feedback = feedback.as_ref().trim().to_string();
        self
    }
}

/// Raw survey payload as posted by the client.
///
/// Unknown fields are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SurveySubmission {
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub reasons: Option<Vec<String>>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

impl SurveySubmission {
    /// Decode a submission body. Malformed JSON and unknown fields are
    /// reported as [`PlenarioError::InvalidInput`].
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| PlenarioError::InvalidInput(format!("malformed survey payload: {e}")))
    }

    /// Validate and normalise into a storable response, using the current time
    /// when the client did not supply a usable timestamp.
    pub fn into_response(self) -> Result<SurveyResponse> {
        self.into_response_at(Utc::now())
    }

    /// Same as [`into_response`](Self::into_response) with an explicit "now".
    pub fn into_response_at(self, now: DateTime<Utc>) -> Result<SurveyResponse> {
        let raw_score = self
            .score
            .ok_or_else(|| PlenarioError::InvalidInput("score is required".to_string()))?;
        let score = validate_score(raw_score)?;

        let expected = Classification::from_score(score);
        // A client label is only kept when it agrees; otherwise it is replaced.
        let classification = match self.classification.as_deref().and_then(Classification::parse) {
            Some(claimed) if claimed == expected => claimed,
            _ => expected,
        };

        let submitted_at = self
            .submitted_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now);

        Ok(SurveyResponse {
            score,
            classification,
            reasons: self.reasons.as_deref().and_then(sanitize_reasons),
            feedback: self
                .feedback
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            submitted_at: format_timestamp(submitted_at),
        })
    }
}

fn validate_score(score: i64) -> Result<u8> {
    u8::try_from(score)
        .ok()
        .filter(|s| *s <= MAX_SCORE)
        .ok_or_else(|| {
            PlenarioError::InvalidInput(format!("score must be between 0 and {MAX_SCORE}"))
        })
}

/// Trim, drop blanks, dedup (exact match, first occurrence wins) and cap at
/// [`MAX_REASONS`]. Returns `None` when nothing survives.
pub fn sanitize_reasons<S: AsRef<str>>(reasons: &[S]) -> Option<Vec<String>> {
    let mut seen = HashSet::with_capacity(reasons.len());
    let cleaned: Vec<String> = reasons
        .iter()
        .map(|r| r.as_ref().trim())
        .filter(|r| !r.is_empty())
        .filter(|r| seen.insert(*r))
        .take(MAX_REASONS)
        .map(str::to_string)
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Format a timestamp the way survey records store it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
