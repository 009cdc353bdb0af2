//! Tests for [`FirestoreClient`] against a mocked REST endpoint.

#![cfg(feature = "firestore")]

use serde_json::{Map, Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plenario::PlenarioError;
use plenario::store::{
    DocumentStore, FirestoreClient, RemoteResponseStore, ResponseStore, SortDirection,
};
use plenario::types::Classification;

const DOCS: &str = "/v1/projects/plenario-test/databases/(default)/documents";

fn client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::with_base_url("plenario-test", "token-123", server.uri())
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[tokio::test]
async fn add_document_sends_typed_fields_and_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/nps_responses")))
        .and(header("authorization", "Bearer token-123"))
        .and(body_partial_json(json!({
            "fields": {
                "score": { "integerValue": "9" },
                "feedback": { "stringValue": "bom" },
                "reasons": { "nullValue": null },
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/plenario-test/databases/(default)/documents/nps_responses/abc123",
            "fields": {},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client(&server)
        .add_document(
            "nps_responses",
            fields(json!({ "score": 9, "feedback": "bom", "reasons": null })),
        )
        .await
        .unwrap();
    assert_eq!(id, "abc123");
}

#[tokio::test]
async fn query_orders_and_decodes_documents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "from": [{ "collectionId": "nps_responses" }],
                "orderBy": [{ "field": { "fieldPath": "submittedAt" }, "direction": "DESCENDING" }],
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "document": {
                    "name": "projects/plenario-test/databases/(default)/documents/nps_responses/b",
                    "fields": {
                        "score": { "integerValue": "10" },
                        "reasons": { "arrayValue": { "values": [{ "stringValue": "rápido" }] } },
                        "submittedAt": { "stringValue": "2026-02-02T00:00:00Z" },
                    }
                },
                "readTime": "2026-02-03T00:00:00Z"
            },
            { "readTime": "2026-02-03T00:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let docs = client(&server)
        .query_documents("nps_responses", "submittedAt", SortDirection::Descending)
        .await
        .unwrap();
    assert_eq!(docs.len(), 1, "metadata-only rows are skipped");
    assert_eq!(docs[0].id, "b");
    assert_eq!(docs[0].fields["score"], json!(10));
    assert_eq!(docs[0].fields["reasons"], json!(["rápido"]));
}

#[tokio::test]
async fn auth_failure_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;

    let err = client(&server)
        .add_document("nps_responses", Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PlenarioError::AuthenticationFailed));
}

#[tokio::test]
async fn server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .query_documents("nps_responses", "submittedAt", SortDirection::Ascending)
        .await
        .unwrap_err();
    match &err {
        PlenarioError::Api { status, message } => {
            assert_eq!(*status, 503);
            assert_eq!(message, "backend unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn remote_store_lists_through_firestore() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "document": { "name": "x/a", "fields": {
                "score": { "doubleValue": 7.0 },
                "submittedAt": { "stringValue": "2026-02-02T00:00:00Z" },
            } } },
            { "document": { "name": "x/b", "fields": {
                "score": { "stringValue": "7" },
            } } },
        ])))
        .mount(&server)
        .await;

    let store = RemoteResponseStore::new(client(&server));
    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].score, 7);
    assert_eq!(listed[0].classification, Classification::Neutral);
    assert_eq!(store.stats().await.skipped, 1);
}
