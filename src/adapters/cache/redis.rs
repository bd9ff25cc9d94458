//! Redis-backed TTL cache for multi-server deployments.
//!
//! Values are stored as JSON strings with a server-side TTL (`SET ... EX`),
//! so expiry needs no sweeper.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::time::Duration;

use crate::ports::{CacheError, RoomCache};

/// Redis implementation of the room cache.
#[derive(Clone)]
pub struct RedisRoomCache {
    conn: ConnectionManager,
}

impl RedisRoomCache {
    /// Connects to Redis at the given URL.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::backend(format!("invalid redis url: {}", e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::backend(format!("redis connection failed: {}", e)))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl RoomCache for RedisRoomCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::backend(e.to_string()))?;
        match raw {
            Some(json) => {
                let value = serde_json::from_str(&json)
                    .map_err(|e| CacheError::backend(format!("corrupt cache entry: {}", e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let json = value.to_string();
        let secs = ttl.as_secs().max(1);
        conn.set_ex(key, json, secs)
            .await
            .map_err(|e| CacheError::backend(e.to_string()))
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del(key)
            .await
            .map_err(|e| CacheError::backend(e.to_string()))
    }
}
