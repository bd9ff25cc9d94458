//! Cache configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Cache configuration
///
/// With `redis_url` set the Redis adapter backs the room cache; without it
/// the in-process cache is used.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL (e.g. `redis://localhost:6379`)
    pub redis_url: Option<String>,

    /// Lifetime of cached room projections, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// TTL as a Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Check if a Redis backend is configured
    pub fn has_redis(&self) -> bool {
        self.redis_url.as_ref().is_some_and(|u| !u.is_empty())
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.redis_url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::InvalidRedisUrl);
            }
        }
        if self.ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTtl);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(120));
        assert!(!config.has_redis());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_redis_url() {
        let config = CacheConfig {
            redis_url: Some("http://localhost".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_ttl() {
        let config = CacheConfig {
            ttl_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
