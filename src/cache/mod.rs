//! Caching subsystem.
//!
//! [`response::TtlCache`] holds chat replies keyed on a conversation
//! fingerprint. It is owned by [`ChatService`](crate::ChatService) and
//! shared with the HTTP layer for health reporting and manual clearing.
//! Replies that used real-time data are never cached.

pub mod response;

pub use response::{CacheConfig, ResponseCache, TtlCache, fingerprint};
