//! Redis read cache for the player sheet
//!
//! Loading the whole sheet on every interaction is wasteful, so loads are
//! cached for a short TTL and the cached copy is dropped after each
//! successful save.

use redis::{AsyncCommands, Client};
use std::env;
use tracing::{debug, info};

use crate::{error::StoreResult, records::PlayerRecord};

const RECORDS_KEY: &str = "scouting:players:all";

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Lifetime of a cached sheet in seconds
    pub ttl_seconds: u64,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// Returns `None` when `REDIS_URL` is unset, which disables caching.
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL
    /// - `RECORD_CACHE_TTL_SECS`: Cache lifetime in seconds (default: 60)
    pub fn from_env() -> Option<Self> {
        let url = env::var("REDIS_URL").ok()?;
        let ttl_seconds = env::var("RECORD_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        Some(RedisConfig { url, ttl_seconds })
    }
}

/// Sheet cache backed by Redis
#[derive(Clone)]
pub struct RecordCache {
    client: Client,
    ttl_seconds: u64,
}

impl RecordCache {
    /// Create the cache client; no connection is made until first use
    pub fn new(config: &RedisConfig) -> StoreResult<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Record cache initialized with TTL of {}s", config.ttl_seconds);
        Ok(RecordCache {
            client,
            ttl_seconds: config.ttl_seconds,
        })
    }

    async fn get_connection(&self) -> StoreResult<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Cached sheet, if present and not expired
    pub async fn get_records(&self) -> StoreResult<Option<Vec<PlayerRecord>>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(RECORDS_KEY).await?;

        match value {
            Some(raw) => {
                debug!("Record cache hit");
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    /// Cache a freshly loaded sheet
    pub async fn put_records(&self, records: &[PlayerRecord]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)?;
        let mut conn = self.get_connection().await?;
        let _: () = conn.set_ex(RECORDS_KEY, raw, self.ttl_seconds).await?;
        Ok(())
    }

    /// Drop the cached sheet
    pub async fn invalidate(&self) -> StoreResult<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(RECORDS_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_redis_config_absent_without_url() {
        unsafe {
            env::remove_var("REDIS_URL");
        }

        assert!(RedisConfig::from_env().is_none());
    }

    #[test]
    #[serial]
    fn test_redis_config_default_ttl() {
        unsafe {
            env::set_var("REDIS_URL", "redis://localhost:6379");
            env::remove_var("RECORD_CACHE_TTL_SECS");
        }

        let config = RedisConfig::from_env().expect("config should be present");
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.ttl_seconds, 60);

        unsafe {
            env::remove_var("REDIS_URL");
        }
    }

    #[test]
    fn test_cache_rejects_invalid_url() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
            ttl_seconds: 60,
        };

        assert!(RecordCache::new(&config).is_err());
    }
}
