//! Language model abstraction.
//!
//! [`ChatService`](crate::ChatService) only needs "turns in, text out", so
//! the seam is a single-method trait. [`GeminiClient`] is the production
//! implementation.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiClient;

use crate::Result;

/// Speaker of a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    /// Map a frontend role name: `assistant`/`model` speak as the model,
    /// anything else as the user.
    pub fn from_frontend(role: &str) -> Self {
        match role {
            "assistant" | "model" => TurnRole::Model,
            _ => TurnRole::User,
        }
    }
}

/// One message in the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// A conversational language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &str;

    /// Produce the next model turn for `turns`.
    ///
    /// Returns [`EmptyResponse`](crate::PlenarioError::EmptyResponse) when
    /// the model answered without any text.
    async fn complete(&self, turns: &[Turn]) -> Result<String>;
}
