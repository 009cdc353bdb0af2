//! Tests for [`FileResponseStore`]: persistence, ordering, startup states.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use plenario::store::{FileResponseStore, ResponseStore};
use plenario::types::{Classification, SurveyResponse};
use plenario::PlenarioError;

fn response(score: u8) -> SurveyResponse {
    let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    SurveyResponse::new(score, at).unwrap()
}

fn store_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("data").join("nps-responses.json")
}

#[tokio::test]
async fn missing_file_starts_empty_and_is_created_on_first_add() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    let store = FileResponseStore::open(&path).unwrap();
    assert!(store.list().await.unwrap().is_empty());
    assert!(!path.exists(), "creation is deferred to the first write");
    assert!(path.parent().unwrap().is_dir(), "parent directory is prepared");

    store.add(response(9)).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn responses_survive_reopen_in_append_order() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    {
        let store = FileResponseStore::open(&path).unwrap();
        store.add(response(3)).await.unwrap();
        store
            .add(response(8).with_reasons(&["rápido", " rápido ", ""]).with_feedback("  bom  "))
            .await
            .unwrap();
        store.add(response(10)).await.unwrap();
    }

    let reopened = FileResponseStore::open(&path).unwrap();
    let listed = reopened.list().await.unwrap();
    let scores: Vec<u8> = listed.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![3, 8, 10], "oldest first");

    assert_eq!(listed[0].classification, Classification::Detractor);
    assert_eq!(listed[1].reasons, Some(vec!["rápido".to_string()]));
    assert_eq!(listed[1].feedback, "bom");
    assert_eq!(listed[2].submitted_at, "2026-01-02T03:04:05Z");
}

#[tokio::test]
async fn persisted_layout_is_a_json_array_of_responses() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    let store = FileResponseStore::open(&path).unwrap();
    store.add(response(7)).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["score"], 7);
    assert_eq!(array[0]["classification"], "neutral");
    assert_eq!(array[0]["submittedAt"], "2026-01-02T03:04:05Z");
    assert!(array[0].get("reasons").is_none());
    assert!(array[0].get("feedback").is_none());

    let tmp = path.with_file_name("nps-responses.json.tmp");
    assert!(!tmp.exists(), "temp file is renamed away");
}

#[tokio::test]
async fn empty_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"").unwrap();

    let store = FileResponseStore::open(&path).unwrap();
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_array_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"[]").unwrap();

    let store = FileResponseStore::open(&path).unwrap();
    assert!(store.list().await.unwrap().is_empty());
}

#[test]
fn corrupt_file_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"{ not json").unwrap();

    let err = FileResponseStore::open(&path).err().unwrap();
    assert!(matches!(err, PlenarioError::CorruptStore { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_are_all_persisted() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let store = Arc::new(FileResponseStore::open(&path).unwrap());

    let mut handles = Vec::new();
    for i in 0..50u8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.add(response(i % 11)).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.list().await.unwrap().len(), 50);

    let reopened = FileResponseStore::open(&path).unwrap();
    assert_eq!(reopened.list().await.unwrap().len(), 50);
}

#[tokio::test]
async fn list_returns_independent_copies() {
    let dir = TempDir::new().unwrap();
    let store = FileResponseStore::open(store_path(&dir)).unwrap();
    store.add(response(5)).await.unwrap();

    let mut first = store.list().await.unwrap();
    first[0].feedback = "mutated".into();

    let second = store.list().await.unwrap();
    assert_eq!(second[0].feedback, "");
}

#[tokio::test]
async fn failed_persist_rolls_back() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let store = FileResponseStore::open(&path).unwrap();
    store.add(response(1)).await.unwrap();

    // A directory where the temp file should go makes the write fail.
    std::fs::create_dir(path.with_file_name("nps-responses.json.tmp")).unwrap();

    let err = store.add(response(2)).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[test]
fn inconsistent_record_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"[{"score": 3, "classification": "promoter", "submittedAt": "2026-02-01T12:00:00Z"}]"#,
    )
    .unwrap();

    let err = FileResponseStore::open(&path).err().unwrap();
    assert!(matches!(err, PlenarioError::CorruptStore { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn failed_rename_removes_temp_file() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let store = FileResponseStore::open(&path).unwrap();
    store.add(response(1)).await.unwrap();

    // A directory at the target path makes the final rename fail.
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    let err = store.add(response(2)).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(!path.with_file_name("nps-responses.json.tmp").exists());
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[test]
fn backend_name() {
    let dir = TempDir::new().unwrap();
    let store = FileResponseStore::open(store_path(&dir)).unwrap();
    assert_eq!(store.backend(), "file");
    assert_eq!(store.path(), store_path(&dir));
}
