//! In-memory TTL cache for testing and single-server deployments.
//!
//! Entries expire lazily: an expired entry is dropped when next read.
//! Not suitable for multi-server deployments.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::ports::{CacheError, RoomCache};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// In-memory TTL key-value cache.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRoomCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryRoomCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomCache for InMemoryRoomCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn returns_stored_value_before_expiry() {
        let cache = InMemoryRoomCache::new();
        cache
            .put("k", json!({"status": "ongoing"}), Duration::from_secs(60))
            .await
            .unwrap();

        let value = cache.get("k").await.unwrap();
        assert_eq!(value, Some(json!({"status": "ongoing"})));
    }

    #[tokio::test]
    async fn expired_entries_read_as_miss() {
        let cache = InMemoryRoomCache::new();
        cache.put("k", json!(1), Duration::ZERO).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = InMemoryRoomCache::new();
        cache
            .put("k", json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        cache.invalidate("k").await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalidating_missing_key_is_noop() {
        let cache = InMemoryRoomCache::new();
        assert!(cache.invalidate("missing").await.is_ok());
    }
}
