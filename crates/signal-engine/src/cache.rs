//! Injected result cache for the analysis service

use async_trait::async_trait;
use cached::{Cached, SizedCache};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::market::TradingMode;

/// Cache key for one analysis request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub symbol: String,
    pub mode: TradingMode,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, mode: TradingMode) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            mode,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbol, self.mode)
    }
}

/// Key/value store with per-entry time-to-live.
///
/// The service never relies on a hit for correctness; a miss just means
/// the result is computed again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<serde_json::Value>;

    async fn set(&self, key: CacheKey, value: serde_json::Value, ttl: Duration);
}

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// Bounded in-memory cache; the least recently used entry goes first once
/// the capacity is reached
pub struct TimedAnalysisCache {
    cache: Arc<RwLock<SizedCache<CacheKey, Entry>>>,
}

impl TimedAnalysisCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Arc::new(RwLock::new(SizedCache::with_size(capacity.max(1)))),
        }
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Number of stored entries, expired ones included until they are read
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for TimedAnalysisCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[async_trait]
impl AnalysisCache for TimedAnalysisCache {
    async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let mut cache = self.cache.write().await;
        match cache.cache_get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                tracing::debug!(%key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                tracing::debug!(%key, "cache entry expired");
                let _ = cache.cache_remove(key);
                None
            }
            None => {
                tracing::debug!(%key, "cache miss");
                None
            }
        }
    }

    async fn set(&self, key: CacheKey, value: serde_json::Value, ttl: Duration) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(
            key,
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_key() {
        let key = CacheKey::new("bbca", TradingMode::Swing);
        assert_eq!(key.symbol, "BBCA");
        assert_eq!(key.to_string(), "BBCA:swing");
        assert_eq!(key, CacheKey::new("BBCA", TradingMode::Swing));
        assert_ne!(key, CacheKey::new("BBCA", TradingMode::Scalping));
    }

    #[test]
    fn test_clones_share_storage() {
        tokio_test::block_on(async {
            let cache = TimedAnalysisCache::new(4);
            let writer = cache.clone();
            let key = CacheKey::new("TLKM", TradingMode::Swing);

            writer.set(key.clone(), json!(true), Duration::from_secs(60)).await;
            assert_eq!(cache.get(&key).await, Some(json!(true)));
        });
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = TimedAnalysisCache::new(10);
        let key = CacheKey::new("BBCA", TradingMode::Intraday);
        let value = json!({"action": "BUY"});

        cache.set(key.clone(), value.clone(), Duration::from_secs(60)).await;
        assert_eq!(cache.get(&key).await, Some(value));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = TimedAnalysisCache::new(10);
        let key = CacheKey::new("BBRI", TradingMode::Intraday);

        cache.set(key.clone(), json!(1), Duration::ZERO).await;
        assert_eq!(cache.get(&key).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let cache = TimedAnalysisCache::new(2);
        let ttl = Duration::from_secs(60);
        let a = CacheKey::new("A", TradingMode::Swing);
        let b = CacheKey::new("B", TradingMode::Swing);
        let c = CacheKey::new("C", TradingMode::Swing);

        cache.set(a.clone(), json!("a"), ttl).await;
        cache.set(b.clone(), json!("b"), ttl).await;
        cache.set(c.clone(), json!("c"), ttl).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&a).await, None);
        assert_eq!(cache.get(&c).await, Some(json!("c")));
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache = TimedAnalysisCache::new(10);
        let ttl = Duration::from_secs(60);
        for symbol in ["A", "B", "C"] {
            cache
                .set(CacheKey::new(symbol, TradingMode::Swing), json!(symbol), ttl)
                .await;
        }

        cache.invalidate(&CacheKey::new("A", TradingMode::Swing)).await;
        assert_eq!(cache.len().await, 2);

        let shared = cache.clone();
        shared.clear().await;
        assert!(cache.is_empty().await);
    }
}
