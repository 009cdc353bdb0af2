//! Chat request/reply types exchanged with the frontend

use serde::{Deserialize, Serialize};

/// One prior turn of the conversation, as sent by the frontend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTurn {
    pub role: String,
    #[serde(default)]
    pub content: String,
    /// Legacy field name for `content`; only read when `content` is empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl ContextTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            text: String::new(),
        }
    }

    /// The turn's text, falling back to the legacy `text` field.
    pub fn body(&self) -> &str {
        if self.content.is_empty() {
            &self.text
        } else {
            &self.content
        }
    }
}

/// Inbound chat request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ContextTurn>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Append a prior turn to the conversation context.
    pub fn with_turn(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.context.push(ContextTurn::new(role, content));
        self
    }
}

/// Reply returned to the frontend (and stored in the response cache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    /// Display timestamp (`"05 de May de 2025 às 14:03"`).
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub real_time: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub cached: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}
