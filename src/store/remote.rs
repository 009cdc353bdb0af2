//! Document-database survey store.
//!
//! [`RemoteResponseStore`] writes one document per response through a
//! [`DocumentStore`] collaborator and reads them back newest first. The
//! collaborator's own consistency guarantees are inherited; the local lock
//! only serialises this process's bookkeeping.
//!
//! # Decoding stored documents
//!
//! Documents may have been written by other clients, so every field is
//! read defensively:
//!
//! - `score` must be an integer-valued number (`7`, `7u64`, `7.0`) within
//!   0–10; anything else skips the document with a warning.
//! - `classification` is always derived from the score; a stored label is
//!   kept only when it agrees.
//! - `reasons` keeps string elements only; absent when none.
//! - `feedback` and `submittedAt` degrade to empty strings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::ResponseStore;
use crate::telemetry;
use crate::Result;
use crate::types::survey::{Classification, MAX_SCORE, SurveyResponse, format_timestamp};

/// Default collection name for survey documents.
pub const DEFAULT_COLLECTION: &str = "nps_responses";

/// Field used to order listings.
const ORDER_FIELD: &str = "submittedAt";

/// Sort direction for [`DocumentStore::query_documents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A stored document: server-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

/// External document database.
///
/// Implemented by [`FirestoreClient`](super::FirestoreClient); tests
/// substitute in-memory fakes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a server-assigned id and return that id.
    async fn add_document(&self, collection: &str, fields: Map<String, Value>) -> Result<String>;

    /// Every document in `collection`, ordered by `order_by`.
    async fn query_documents(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>>;

    /// Release connections. Default: nothing to release.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn add_document(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        (**self).add_document(collection, fields).await
    }

    async fn query_documents(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>> {
        (**self).query_documents(collection, order_by, direction).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}

/// Counters kept by this process; not shared with other writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteStats {
    pub written: u64,
    pub skipped: u64,
}

/// Survey store backed by a [`DocumentStore`].
///
/// `list` returns responses ordered by `submittedAt`, **newest first**.
pub struct RemoteResponseStore<D> {
    documents: D,
    collection: String,
    stats: RwLock<RemoteStats>,
}

impl<D: DocumentStore> RemoteResponseStore<D> {
    /// Store writing to [`DEFAULT_COLLECTION`].
    pub fn new(documents: D) -> Self {
        Self::with_collection(documents, DEFAULT_COLLECTION)
    }

    pub fn with_collection(documents: D, collection: impl Into<String>) -> Self {
        Self {
            documents,
            collection: collection.into(),
            stats: RwLock::new(RemoteStats::default()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Local write/skip counters since construction.
    pub async fn stats(&self) -> RemoteStats {
        *self.stats.read().await
    }
}

#[async_trait]
impl<D: DocumentStore> ResponseStore for RemoteResponseStore<D> {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    #[instrument(name = "store.remote.add", skip(self, entry), fields(collection = %self.collection))]
    async fn add(&self, entry: SurveyResponse) -> Result<()> {
        let mut stats = self.stats.write().await;
        let fields = to_fields(&entry);

        match self.documents.add_document(&self.collection, fields).await {
            Ok(id) => {
                stats.written += 1;
                metrics::counter!(telemetry::SURVEY_WRITES_TOTAL, "backend" => self.backend(), "status" => "ok")
                    .increment(1);
                info!(
                    id = %id,
                    score = entry.score,
                    classification = %entry.classification,
                    "survey response stored"
                );
                Ok(())
            }
            Err(e) => {
                metrics::counter!(telemetry::SURVEY_WRITES_TOTAL, "backend" => self.backend(), "status" => "error")
                    .increment(1);
                warn!(error = %e, "failed to store survey response");
                Err(e)
            }
        }
    }

    #[instrument(name = "store.remote.list", skip(self), fields(collection = %self.collection))]
    async fn list(&self) -> Result<Vec<SurveyResponse>> {
        let documents = self
            .documents
            .query_documents(&self.collection, ORDER_FIELD, SortDirection::Descending)
            .await?;

        let mut responses = Vec::with_capacity(documents.len());
        let mut skipped = 0u64;
        for doc in documents {
            match from_fields(&doc.fields) {
                Some(response) => responses.push(response),
                None => {
                    skipped += 1;
                    warn!(id = %doc.id, score = ?doc.fields.get("score"), "skipping survey document with invalid score");
                }
            }
        }

        if skipped > 0 {
            self.stats.write().await.skipped += skipped;
            metrics::counter!(telemetry::SURVEY_SKIPPED_TOTAL, "backend" => self.backend())
                .increment(skipped);
        }
        debug!(count = responses.len(), skipped, "listed survey documents");
        Ok(responses)
    }

    async fn close(&self) -> Result<()> {
        self.documents.close().await
    }
}

/// Document fields for a response, plus a server-side `createdAt`.
fn to_fields(entry: &SurveyResponse) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("score".into(), Value::from(entry.score));
    fields.insert(
        "classification".into(),
        Value::from(entry.classification.as_str()),
    );
    fields.insert(
        "reasons".into(),
        entry
            .reasons
            .as_ref()
            .map(|r| Value::from(r.clone()))
            .unwrap_or(Value::Null),
    );
    fields.insert("feedback".into(), Value::from(entry.feedback.clone()));
    fields.insert("submittedAt".into(), Value::from(entry.submitted_at.clone()));
    fields.insert("createdAt".into(), Value::from(format_timestamp(Utc::now())));
    fields
}

/// Decode a stored document. `None` means the score is unusable.
fn from_fields(fields: &Map<String, Value>) -> Option<SurveyResponse> {
    let score = fields.get("score").and_then(coerce_score)?;

    // The score decides; a stored label only survives when it agrees.
    let classification = Classification::from_score(score);
    if let Some(stored) = fields.get("classification").and_then(Value::as_str)
        && Classification::parse(stored) != Some(classification)
    {
        debug!(stored, derived = %classification, "stored classification replaced");
    }

    let reasons = fields
        .get("reasons")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|r| !r.is_empty());

    Some(SurveyResponse {
        score,
        classification,
        reasons,
        feedback: string_field(fields, "feedback"),
        submitted_at: string_field(fields, ORDER_FIELD),
    })
}

/// Accept any integer-valued numeric representation within 0–10.
fn coerce_score(value: &Value) -> Option<u8> {
    let n = value.as_number()?;
    let int = if let Some(i) = n.as_i64() {
        i
    } else if let Some(u) = n.as_u64() {
        i64::try_from(u).ok()?
    } else {
        let f = n.as_f64()?;
        if f.fract() != 0.0 || !f.is_finite() {
            return None;
        }
        f as i64
    };
    u8::try_from(int).ok().filter(|s| *s <= MAX_SCORE)
}

fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
