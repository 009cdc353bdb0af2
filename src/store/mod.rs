//! Durable NPS survey storage.
//!
//! [`ResponseStore`] is the single capability interface; exactly two
//! backends implement it:
//!
//! - [`FileResponseStore`]: one JSON array on local disk, rewritten
//!   atomically (tmp file + rename) on every append. `list` returns
//!   append order, **oldest first**.
//! - [`RemoteResponseStore`]: one document per response in an external
//!   [`DocumentStore`] (Firestore in production). `list` returns
//!   submission order, **newest first**.
//!
//! Callers must not assume the two backends order results the same way.
//!
//! # Errors
//!
//! - I/O or remote failures are returned from `add`/`list` and report
//!   [`is_retryable()`](crate::PlenarioError::is_retryable) as `true`.
//! - A corrupt file is fatal when opening the file store.
//! - A single malformed remote record is skipped (and logged) during
//!   `list`; it never fails the listing.

use async_trait::async_trait;

use crate::Result;
use crate::types::SurveyResponse;

#[cfg(feature = "firestore")]
pub mod firestore;
pub mod file;
pub mod remote;

pub use file::FileResponseStore;
#[cfg(feature = "firestore")]
pub use firestore::FirestoreClient;
pub use remote::{Document, DocumentStore, RemoteResponseStore, SortDirection};

/// Append-only store of accepted survey responses.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Backend name for logging and metrics (`"file"`, `"firestore"`).
    fn backend(&self) -> &'static str;

    /// Append one response. The store keeps its own copy.
    async fn add(&self, entry: SurveyResponse) -> Result<()>;

    /// All stored responses, in the backend's documented order.
    async fn list(&self) -> Result<Vec<SurveyResponse>>;

    /// Release backend resources. Default: nothing to release.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
