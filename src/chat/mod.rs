//! Conversation orchestration.
//!
//! [`ChatService`] ties the pieces together for one chat request:
//!
//! 1. Serve a cached reply when the same message and context were seen
//!    within the cache TTL.
//! 2. Decide whether the question needs live government data and, if so,
//!    append a rendered [`RealTimeBundle`](crate::RealTimeBundle) to it.
//! 3. Call the [`ChatModel`] with instructions, history and the question.
//! 4. Cache the reply unless it used live data.

pub mod prompt;

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info, instrument};

use crate::cache::{ResponseCache, fingerprint};
use crate::llm::{ChatModel, Turn, TurnRole};
use crate::realtime::RealTimeAggregator;
use crate::types::realtime::DISPLAY_FORMAT;
use crate::types::{ChatReply, ChatRequest};
use crate::{PlenarioError, Result};

/// Characters of the question and reply echoed in logs.
const LOG_PREVIEW_CHARS: usize = 100;

/// Answers chat requests.
pub struct ChatService {
    cache: Arc<ResponseCache>,
    aggregator: Arc<RealTimeAggregator>,
    model: Arc<dyn ChatModel>,
}

impl ChatService {
    pub fn new(
        cache: Arc<ResponseCache>,
        aggregator: Arc<RealTimeAggregator>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            cache,
            aggregator,
            model,
        }
    }

    /// The reply cache, shared with health reporting and manual clearing.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Answer `request` using the local clock.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.chat_at(request, Local::now()).await
    }

    /// Answer `request` as of `now`.
    ///
    /// # Errors
    ///
    /// - [`PlenarioError::InvalidInput`] for an empty message.
    /// - Any model failure other than an empty answer, which degrades to a
    ///   fixed apology instead.
    #[instrument(name = "chat", skip_all, fields(context = request.context.len()))]
    pub async fn chat_at(&self, request: &ChatRequest, now: DateTime<Local>) -> Result<ChatReply> {
        if request.message.trim().is_empty() {
            return Err(PlenarioError::InvalidInput("message is required".into()));
        }

        let key = fingerprint(&request.message, &request.context);
        if let Some(mut reply) = self.cache.get(&key) {
            reply.cached = true;
            return Ok(reply);
        }

        let needs_real_time = self.aggregator.needs_augmentation(&request.message);

        let mut turns = Vec::with_capacity(request.context.len() + 3);
        turns.push(Turn::user(prompt::system_instructions(now)));
        turns.push(Turn::model(prompt::ACKNOWLEDGEMENT));
        turns.extend(request.context.iter().map(|turn| Turn {
            role: TurnRole::from_frontend(&turn.role),
            text: turn.body().to_string(),
        }));

        let mut message = request.message.clone();
        if needs_real_time {
            debug!(query = %preview(&request.message, 50), "fetching real-time data");
            let bundle = self.aggregator.fetch_at(&request.message, now).await;
            message.push_str(&prompt::render_real_time(&bundle));
        }
        turns.push(Turn::user(message));

        let reply = match self.model.complete(&turns).await {
            Ok(text) => text,
            Err(PlenarioError::EmptyResponse) => prompt::FALLBACK_REPLY.to_string(),
            Err(e) => return Err(e),
        };

        let timestamp = now.format(DISPLAY_FORMAT).to_string();
        info!(
            question = %preview(&request.message, LOG_PREVIEW_CHARS),
            answer = %preview(&reply, LOG_PREVIEW_CHARS),
            real_time = needs_real_time,
            model = self.model.name(),
            "chat answered"
        );

        let reply = ChatReply {
            reply,
            timestamp,
            real_time: needs_real_time,
            cached: false,
        };
        if !needs_real_time {
            self.cache.set(key, reply.clone());
        }
        Ok(reply)
    }
}

fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
