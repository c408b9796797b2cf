//! Redis cache module
//!
//! Thin wrapper over a Redis client storing JSON values with a TTL. The
//! media gateway keeps recent provider pages here; caching is optional.

use anyhow::{Context, Result};
use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Read the Redis configuration from the environment
    ///
    /// Returns `None` when `REDIS_URL` is unset or empty, which disables caching.
    pub fn from_env() -> Option<Self> {
        std::env::var("REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| RedisConfig { url })
    }
}

/// Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Initialize a new Redis connection pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool { client })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Store `value` as JSON under `key`, expiring after `ttl_seconds`
    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let mut conn = self.get_connection().await?;
        let _: () = conn.set_ex(key, raw, ttl_seconds).await?;
        Ok(())
    }

    /// Load a JSON value stored by [`RedisPool::put_json`]
    ///
    /// An entry that no longer decodes as `T` is reported as an error.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn.get(key).await?;

        raw.map(|raw| serde_json::from_str(&raw))
            .transpose()
            .with_context(|| format!("Unreadable cache entry {}", key))
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_redis_config_disabled_without_url() {
        unsafe {
            std::env::remove_var("REDIS_URL");
        }
        assert!(RedisConfig::from_env().is_none());

        unsafe {
            std::env::set_var("REDIS_URL", "  ");
        }
        assert!(RedisConfig::from_env().is_none());

        unsafe {
            std::env::set_var("REDIS_URL", "redis://cache:6379");
        }
        assert_eq!(RedisConfig::from_env().unwrap().url, "redis://cache:6379");

        unsafe {
            std::env::remove_var("REDIS_URL");
        }
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_json_round_trip_with_ttl() -> Result<()> {
        let config = RedisConfig {
            url: "redis://localhost:6379".to_string(),
        };

        let pool = RedisPool::new(&config).await?;
        assert!(pool.health_check().await?);

        let key = "reelbox:test:page";
        pool.put_json(key, &vec!["a", "b"], 1).await?;
        assert_eq!(
            pool.get_json::<Vec<String>>(key).await?,
            Some(vec!["a".to_string(), "b".to_string()])
        );

        // Stored shape does not match the requested type
        assert!(pool.get_json::<u32>(key).await.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert_eq!(pool.get_json::<Vec<String>>(key).await?, None);

        Ok(())
    }
}
