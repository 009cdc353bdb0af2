//! Core types for plenario

pub mod chat;
pub mod realtime;
pub mod survey;

pub use chat::{ChatReply, ChatRequest, ContextTurn};
pub use realtime::{RealTimeBundle, RealTimeResult};
pub use survey::{Classification, SurveyResponse, SurveySubmission, sanitize_reasons};
