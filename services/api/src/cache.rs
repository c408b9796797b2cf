//! Provider page cache
//!
//! Successful provider pages are kept in Redis for a short TTL. Every cache
//! failure is logged and treated as a miss; the gateway never fails a
//! request because Redis is down.

use common::cache::RedisPool;
use media::{MediaKind, MediaPage, SearchQuery};
use std::env;
use tracing::{debug, warn};

/// Default lifetime of a cached page
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Clone)]
pub struct PageCache {
    pool: Option<RedisPool>,
    ttl_secs: u64,
}

impl PageCache {
    pub fn new(pool: RedisPool, ttl_secs: u64) -> Self {
        Self {
            pool: Some(pool),
            ttl_secs,
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self {
            pool: None,
            ttl_secs: 0,
        }
    }

    /// Read `MEDIA_CACHE_TTL` (seconds, default 300)
    pub fn ttl_from_env() -> u64 {
        env::var("MEDIA_CACHE_TTL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS)
    }

    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    pub fn key(kind: MediaKind, query: &SearchQuery) -> String {
        format!(
            "media:{}:{}:{}:{}",
            kind.as_str(),
            query.query.to_lowercase(),
            query.page,
            query.per_page
        )
    }

    pub async fn get(&self, kind: MediaKind, query: &SearchQuery) -> Option<MediaPage> {
        let pool = self.pool.as_ref()?;
        let key = Self::key(kind, query);

        match pool.get_json(&key).await {
            Ok(Some(page)) => {
                debug!("Cache hit for {}", key);
                Some(page)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {}: {:#}", key, e);
                None
            }
        }
    }

    pub async fn put(&self, kind: MediaKind, query: &SearchQuery, page: &MediaPage) {
        let Some(pool) = self.pool.as_ref() else {
            return;
        };
        let key = Self::key(kind, query);

        if let Err(e) = pool.put_json(&key, page, self.ttl_secs).await {
            warn!("Cache write failed for {}: {:#}", key, e);
        }
    }
}
