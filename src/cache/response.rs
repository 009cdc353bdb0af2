//! Time-bounded chat response cache.
//!
//! [`TtlCache`] maps a conversation [`fingerprint`] to the reply produced
//! for it. Entries are visible while `now - created_at <= max_age`.
//!
//! # Expiry
//!
//! Expiry is a read-time check only. Expired entries stay in the map (and
//! in [`len`](TtlCache::len)) until the same fingerprint is written again
//! or the whole cache is [cleared](TtlCache::clear). There is no reaper
//! task and no size bound.
//!
//! # Clock
//!
//! Ages are measured with [`tokio::time::Instant`]. Outside a paused tokio
//! runtime this is the system monotonic clock; under
//! `#[tokio::test(start_paused = true)]` tests can move time with
//! `tokio::time::advance` and hit the expiry boundary exactly.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::telemetry;
use crate::types::{ChatReply, ContextTurn};

/// Separator between the message and the serialized context in a fingerprint.
const FINGERPRINT_SEPARATOR: char = '_';

/// Maximum fingerprint length echoed in log lines.
const LOG_KEY_CHARS: usize = 50;

/// Configuration for the response cache.
///
/// ```rust
/// # use plenario::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new().ttl(Duration::from_secs(120));
/// assert_eq!(config.ttl, Duration::from_secs(120));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum entry age. Default: 5 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum entry age.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

/// In-memory map from fingerprint to value with an age limit.
///
/// Readers share a read lock; `set` and `clear` take the write lock. No
/// operation awaits or performs I/O while holding the lock.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    max_age: Duration,
}

/// The cache used by [`ChatService`](crate::ChatService).
pub type ResponseCache = TtlCache<ChatReply>;

impl<V: Clone> TtlCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age: config.ttl,
        }
    }

    /// Look up a live entry. Returns `None` when absent or older than `max_age`.
    pub fn get(&self, fingerprint: &str) -> Option<V> {
        let hit = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            entries
                .get(fingerprint)
                .filter(|entry| entry.created_at.elapsed() <= self.max_age)
                .map(|entry| entry.value.clone())
        };

        if hit.is_some() {
            debug!(key = %truncate(fingerprint), "cache hit");
            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        }
        hit
    }

    /// Insert or overwrite the entry for `fingerprint`, stamped with the current time.
    pub fn set(&self, fingerprint: impl Into<String>, value: V) {
        let fingerprint = fingerprint.into();
        debug!(key = %truncate(&fingerprint), "cache save");
        let entry = CacheEntry {
            value,
            created_at: Instant::now(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fingerprint, entry);
    }

    /// Drop every entry. Returns how many entries were held before.
    pub fn clear(&self) -> usize {
        let previous = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *entries)
        };
        info!(cleared = previous.len(), "response cache cleared");
        previous.len()
    }

    /// Number of stored entries, including expired ones not yet overwritten.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured maximum entry age.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

/// Derive the cache key for a message and its ordered context.
///
/// `{message}_{context}` where `context` is the compact JSON array of
/// `{"role","content"}` pairs in the order given, or empty when there is
/// no context. The context is never sorted or deduplicated.
pub fn fingerprint(message: &str, context: &[ContextTurn]) -> String {
    let serialized = if context.is_empty() {
        String::new()
    } else {
        let pairs: Vec<FingerprintTurn<'_>> = context
            .iter()
            .map(|turn| FingerprintTurn {
                role: &turn.role,
                content: turn.body(),
            })
            .collect();
        // Serialising borrowed strings cannot fail.
        serde_json::to_string(&pairs).unwrap_or_default()
    };
    format!("{message}{FINGERPRINT_SEPARATOR}{serialized}")
}

/// Field order is part of the key format.
#[derive(Serialize)]
struct FingerprintTurn<'a> {
    role: &'a str,
    content: &'a str,
}

fn truncate(key: &str) -> String {
    match key.char_indices().nth(LOG_KEY_CHARS) {
        Some((idx, _)) => format!("{}...", &key[..idx]),
        None => key.to_string(),
    }
}
