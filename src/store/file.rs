//! Local JSON-file survey store.
//!
//! The whole response sequence lives in memory and is persisted as a
//! single JSON array. Each `add` rewrites the full file through a sibling
//! `.tmp` file and an atomic rename, so a reader never sees a partially
//! written array. Survey volume is low, so the O(n) rewrite per append is
//! accepted.
//!
//! A second process writing the same file is not supported.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::ResponseStore;
use crate::telemetry;
use crate::types::SurveyResponse;
use crate::{PlenarioError, Result};

const BACKEND: &str = "file";

/// Default location of the survey file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "data/nps-responses.json";

/// Survey store backed by one JSON array file.
///
/// `list` returns responses in append order (oldest first).
pub struct FileResponseStore {
    path: PathBuf,
    responses: RwLock<Vec<SurveyResponse>>,
}

impl FileResponseStore {
    /// Open (or prepare) the store at `path`.
    ///
    /// - Missing file: start empty; the file is created by the first `add`.
    /// - Empty or whitespace-only file: start empty.
    /// - Anything that is not a JSON array of responses, or a record whose
    ///   score is out of range or disagrees with its classification:
    ///   [`PlenarioError::CorruptStore`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir(&path)?;

        let responses = match std::fs::read(&path) {
            Ok(bytes) => parse_existing(&path, &bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "survey file absent, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), count = responses.len(), "opened survey file store");
        Ok(Self {
            path,
            responses: RwLock::new(responses),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResponseStore for FileResponseStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    #[instrument(name = "store.file.add", skip(self, entry), fields(score = entry.score))]
    async fn add(&self, entry: SurveyResponse) -> Result<()> {
        let mut responses = self.responses.write().await;
        responses.push(entry);

        // The lock stays held across the write so concurrent appends serialise.
        if let Err(e) = persist(&self.path, &responses).await {
            responses.pop();
            warn!(path = %self.path.display(), error = %e, "failed to persist survey response");
            metrics::counter!(telemetry::SURVEY_WRITES_TOTAL, "backend" => BACKEND, "status" => "error")
                .increment(1);
            return Err(e);
        }

        metrics::counter!(telemetry::SURVEY_WRITES_TOTAL, "backend" => BACKEND, "status" => "ok")
            .increment(1);
        debug!(count = responses.len(), "survey response persisted");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SurveyResponse>> {
        Ok(self.responses.read().await.clone())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn parse_existing(path: &Path, bytes: &[u8]) -> Result<Vec<SurveyResponse>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!(path = %path.display(), "survey file empty, starting empty");
        return Ok(Vec::new());
    }
    let responses: Vec<SurveyResponse> =
        serde_json::from_slice(bytes).map_err(|e| corrupt(path, e.to_string()))?;

    // Records are only ever written validated; anything else was edited by hand.
    if let Some((index, bad)) = responses
        .iter()
        .enumerate()
        .find(|(_, response)| !response.is_consistent())
    {
        return Err(corrupt(
            path,
            format!(
                "record {index}: score {} does not match classification {}",
                bad.score, bad.classification
            ),
        ));
    }
    Ok(responses)
}

fn corrupt(path: &Path, message: String) -> PlenarioError {
    PlenarioError::CorruptStore {
        path: path.display().to_string(),
        message,
    }
}

/// Serialise `responses` and atomically replace the file at `path`.
async fn persist(path: &Path, responses: &[SurveyResponse]) -> Result<()> {
    let payload = if responses.is_empty() {
        b"[]".to_vec()
    } else {
        serde_json::to_vec_pretty(responses)?
    };

    let tmp_path = tmp_sibling(path);
    let result = write_then_rename(&tmp_path, path, &payload).await;
    if result.is_err()
        && let Err(e) = tokio::fs::remove_file(&tmp_path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        debug!(path = %tmp_path.display(), error = %e, "stale temp file left behind");
    }
    result
}

async fn write_then_rename(tmp_path: &Path, path: &Path, payload: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(tmp_path).await?;
    file.write_all(payload).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(tmp_path, path).await?;
    Ok(())
}

/// `<path>.tmp`, keeping the original extension visible.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
