//! Plenário - civic chatbot backend for Brazilian public information
//!
//! This crate relays questions about Brazilian politics to a language
//! model, augmenting them with live data from official open-data APIs, and
//! stores Net Promoter Score survey answers.
//!
//! The main pieces are independent and explicitly wired together:
//!
//! - [`ResponseCache`]: time-bounded reply cache keyed on the conversation.
//! - [`RealTimeAggregator`]: concurrent, timeout-bounded lookups against
//!   Câmara, Senado and static official pointers.
//! - [`ResponseStore`](store::ResponseStore): durable survey storage with a
//!   local file backend and a document-database backend.
//! - [`ChatService`]: the per-request orchestration over a
//!   [`ChatModel`](llm::ChatModel).
//!
//! # Chat Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use plenario::{
//!     CacheConfig, ChatRequest, ChatService, GeminiClient, RealTimeAggregator,
//!     RealTimeConfig, ResponseCache,
//! };
//!
//! #[tokio::main]
//! async fn main() -> plenario::Result<()> {
//!     let service = ChatService::new(
//!         Arc::new(ResponseCache::new(&CacheConfig::default())),
//!         Arc::new(RealTimeAggregator::new(RealTimeConfig::default())),
//!         Arc::new(GeminiClient::new("your-gemini-key")),
//!     );
//!
//!     let reply = service
//!         .chat(&ChatRequest::new("Quais projetos estão em tramitação?"))
//!         .await?;
//!     println!("{}", reply.reply);
//!     Ok(())
//! }
//! ```
//!
//! # Survey Example
//!
//! ```rust,no_run
//! use plenario::store::{FileResponseStore, ResponseStore};
//! use plenario::SurveySubmission;
//!
//! #[tokio::main]
//! async fn main() -> plenario::Result<()> {
//!     let store = FileResponseStore::open("data/nps-responses.json")?;
//!     let entry = SurveySubmission::from_json(br#"{"score": 9}"#)?.into_response()?;
//!     store.add(entry).await?;
//!     println!("{} responses", store.list().await?.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod catalog;
pub mod chat;
pub mod error;
pub mod llm;
pub mod realtime;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod version;

pub use cache::{CacheConfig, ResponseCache, TtlCache};
pub use chat::ChatService;
pub use error::{PlenarioError, Result};
pub use llm::{ChatModel, GeminiClient, Turn, TurnRole};
pub use realtime::{RealTimeAggregator, RealTimeConfig, needs_augmentation};
pub use store::{FileResponseStore, ResponseStore};
pub use types::{
    ChatReply, ChatRequest, Classification, ContextTurn, RealTimeBundle, RealTimeResult,
    SurveyResponse, SurveySubmission,
};
pub use version::{PKG_VERSION, version_string};
