//! Room cache port - best-effort TTL cache for hot read paths.
//!
//! Readers tolerate stale-or-cleared entries; writers invalidate affected
//! keys synchronously with the mutation that makes them stale. Cache
//! failures are logged by callers, never surfaced to end users.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{RoomCode, RoomId};

/// TTL key-value cache for room read-projections.
#[async_trait]
pub trait RoomCache: Send + Sync {
    /// Fetches a live entry, or `None` on miss/expiry.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores a value with the given time-to-live.
    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    /// Removes an entry. Removing a missing key is a no-op.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache key for a room's status projection.
pub fn status_key(room_id: &RoomId) -> String {
    format!("debate_status_{}", room_id)
}

/// Cache key for a room's transcript projection.
pub fn transcript_key(room_id: &RoomId) -> String {
    format!("transcript_{}", room_id)
}

/// Cache key for room lookup by join code.
pub fn code_key(code: &RoomCode) -> String {
    format!("room_code_{}", code)
}

/// Errors from a cache backend.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Cache backend error: {message}")]
    Backend { message: String },
}

impl CacheError {
    pub fn backend(message: impl Into<String>) -> Self {
        CacheError::Backend {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_per_entity() {
        let room_id = RoomId::new();
        assert_eq!(status_key(&room_id), status_key(&room_id));
        assert_ne!(status_key(&room_id), transcript_key(&room_id));

        let code = RoomCode::new("ab12").unwrap();
        assert_eq!(code_key(&code), "room_code_AB12");
    }
}
