//! Firestore REST client implementing [`DocumentStore`].
//!
//! Talks to the v1 REST API with a bearer token:
//! <https://firebase.google.com/docs/firestore/reference/rest>
//!
//! Firestore wraps every field in a typed value (`{"integerValue": "7"}`,
//! `{"stringValue": "..."}`); [`encode_value`] and [`decode_value`] map
//! between that shape and plain JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use super::remote::{Document, DocumentStore, SortDirection};
use crate::realtime::fetch::client_with_timeout;
use crate::{PlenarioError, Result};

/// Default base URL for the Firestore REST API.
const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one Firestore database (`(default)`).
#[derive(Clone)]
pub struct FirestoreClient {
    project_id: String,
    access_token: String,
    http: Client,
    base_url: String,
}

impl FirestoreClient {
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_base_url(project_id, access_token, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (emulator or wiremock).
    pub fn with_base_url(
        project_id: impl Into<String>,
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let http = client_with_timeout(REQUEST_TIMEOUT);

        Self {
            project_id: project_id.into(),
            access_token: access_token.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            self.base_url, self.project_id
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status.as_u16() {
            401 | 403 => Err(PlenarioError::AuthenticationFailed),
            429 => Err(PlenarioError::RateLimited { retry_after: None }),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(PlenarioError::Api {
                    status: code,
                    message: truncate_body(body),
                })
            }
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    #[instrument(name = "firestore.add_document", skip(self, fields))]
    async fn add_document(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        let url = format!("{}/{}", self.documents_url(), collection);
        let body = json!({ "fields": encode_fields(&fields) });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        let created: CreatedDocument = Self::check(response).await?.json().await?;

        let id = document_id(&created.name).to_string();
        debug!(id = %id, "firestore document created");
        Ok(id)
    }

    #[instrument(name = "firestore.query_documents", skip(self))]
    async fn query_documents(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url());
        let direction = match direction {
            SortDirection::Ascending => "ASCENDING",
            SortDirection::Descending => "DESCENDING",
        };
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{ "field": { "fieldPath": order_by }, "direction": direction }],
            }
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        let rows: Vec<QueryRow> = Self::check(response).await?.json().await?;

        // Rows without a document only carry read metadata.
        let documents: Vec<Document> = rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(|doc| Document {
                id: document_id(&doc.name).to_string(),
                fields: decode_fields(&doc.fields),
            })
            .collect();
        debug!(count = documents.len(), "firestore query returned");
        Ok(documents)
    }
}

#[derive(Deserialize)]
struct CreatedDocument {
    name: String,
}

#[derive(Deserialize)]
struct QueryRow {
    document: Option<RawDocument>,
}

#[derive(Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Last path segment of a document resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn encode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

/// Plain JSON to a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore carries 64-bit integers as strings.
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Firestore typed value to plain JSON. Unknown shapes decode to `null`.
pub fn decode_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = map.iter().next() else {
        return Value::Null;
    };
    match kind.as_str() {
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            Value::Number(_) => inner.clone(),
            _ => Value::Null,
        },
        "doubleValue" | "booleanValue" => inner.clone(),
        "stringValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

fn truncate_body(body: String) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body,
    }
}
