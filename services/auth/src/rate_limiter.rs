//! Rate limiter for failed login attempts

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failed attempts allowed inside one window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

#[derive(Debug)]
struct RateLimiterEntry {
    failures: u32,
    window_start: Instant,
    ban_expires: Option<Instant>,
}

/// Per-key failure counter with temporary bans
///
/// Constructed by the caller and carried in application state; there is no
/// process-global instance.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check whether `key` may attempt another login
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let Some(entry) = entries.get_mut(key) else {
            return true;
        };

        if let Some(ban_expires) = entry.ban_expires {
            if now < ban_expires {
                return false;
            }
            entries.remove(key);
            return true;
        }

        if now.duration_since(entry.window_start) >= self.window() {
            entries.remove(key);
        }

        true
    }

    /// Record a failed attempt for `key`, banning it once the limit is hit
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = self.window();

        // Drop entries whose window and ban have both lapsed.
        entries.retain(|_, entry| match entry.ban_expires {
            Some(ban_expires) => now < ban_expires,
            None => now.duration_since(entry.window_start) < window,
        });

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            failures: 0,
            window_start: now,
            ban_expires: None,
        });

        entry.failures += 1;

        if entry.failures >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
        }
    }

    /// Forget all failures for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts: 3,
            window_seconds: 60,
            ban_duration_seconds: 600,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_bans_after_max_failures() {
        let limiter = limiter();

        for _ in 0..2 {
            limiter.record_failure("a@b.com").await;
            assert!(limiter.is_allowed("a@b.com").await);
        }

        limiter.record_failure("a@b.com").await;
        assert!(!limiter.is_allowed("a@b.com").await);
        assert!(limiter.is_allowed("other@b.com").await);

        tokio::time::advance(Duration::from_secs(601)).await;
        assert!(limiter.is_allowed("a@b.com").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_expire_with_window() {
        let limiter = limiter();

        limiter.record_failure("a@b.com").await;
        limiter.record_failure("a@b.com").await;

        tokio::time::advance(Duration::from_secs(61)).await;
        limiter.record_failure("a@b.com").await;

        assert!(limiter.is_allowed("a@b.com").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_evicted() {
        let limiter = limiter();

        for i in 0..1000 {
            limiter.record_failure(&format!("user{}@b.com", i)).await;
        }
        for _ in 0..3 {
            limiter.record_failure("banned@b.com").await;
        }
        assert_eq!(limiter.entries.lock().await.len(), 1001);

        tokio::time::advance(Duration::from_secs(61)).await;
        limiter.record_failure("fresh@b.com").await;

        // Only the ban and the new failure remain
        assert_eq!(limiter.entries.lock().await.len(), 2);
        assert!(!limiter.is_allowed("banned@b.com").await);

        tokio::time::advance(Duration::from_secs(600)).await;
        limiter.record_failure("fresh@b.com").await;
        assert_eq!(limiter.entries.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_failures() {
        let limiter = limiter();

        for _ in 0..3 {
            limiter.record_failure("a@b.com").await;
        }
        assert!(!limiter.is_allowed("a@b.com").await);

        limiter.reset("a@b.com").await;
        assert!(limiter.is_allowed("a@b.com").await);
    }
}
