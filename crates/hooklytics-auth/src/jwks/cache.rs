//! Process-wide key set cache.
//!
//! Built on a moka future cache: `get_with` coalesces concurrent loads of
//! the same URL into one fetch, and a per-entry [`Expiry`] gives successful
//! fetches the normal TTL and failed fetches a much shorter one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use tracing::{info, warn};

use hooklytics_core::config::AuthConfig;

use crate::error::AuthError;
use crate::jwks::fetcher::KeySetFetcher;
use crate::jwks::key_set::KeySet;

#[derive(Debug, Clone)]
enum CacheEntry {
    Ready(Arc<KeySet>),
    Failed(String),
}

#[derive(Debug)]
struct EntryExpiry {
    ttl: Duration,
    failure_ttl: Duration,
}

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        match value {
            CacheEntry::Ready(_) => Some(self.ttl),
            CacheEntry::Failed(_) => Some(self.failure_ttl),
        }
    }
}

/// Caches key sets per JWKS URL.
#[derive(Debug, Clone)]
pub struct KeySetCache {
    fetcher: Arc<dyn KeySetFetcher>,
    entries: Cache<String, CacheEntry>,
    /// When each URL was last re-fetched for an unknown key id.
    refreshed_at: Cache<String, Instant>,
    min_refresh: Duration,
}

impl KeySetCache {
    /// Creates a cache from auth configuration.
    pub fn new(fetcher: Arc<dyn KeySetFetcher>, config: &AuthConfig) -> Self {
        Self::with_ttls(
            fetcher,
            Duration::from_secs(config.jwks_ttl_seconds),
            Duration::from_secs(config.jwks_failure_ttl_seconds),
            Duration::from_secs(config.jwks_min_refresh_seconds),
        )
    }

    /// Creates a cache with explicit durations.
    pub fn with_ttls(
        fetcher: Arc<dyn KeySetFetcher>,
        ttl: Duration,
        failure_ttl: Duration,
        min_refresh: Duration,
    ) -> Self {
        let entries = Cache::builder()
            .max_capacity(16)
            .expire_after(EntryExpiry { ttl, failure_ttl })
            .build();

        Self {
            fetcher,
            entries,
            refreshed_at: Cache::new(16),
            min_refresh,
        }
    }

    /// Returns the key set for `url`, fetching it if absent or expired.
    ///
    /// Concurrent callers that miss at the same time share one fetch.
    pub async fn get(&self, url: &str) -> Result<Arc<KeySet>, AuthError> {
        let fetcher = Arc::clone(&self.fetcher);
        let fetch_url = url.to_string();

        let entry = self
            .entries
            .get_with(url.to_string(), async move { load(fetcher, &fetch_url).await })
            .await;

        match entry {
            CacheEntry::Ready(set) => Ok(set),
            CacheEntry::Failed(reason) => Err(AuthError::KeySetUnavailable(reason)),
        }
    }

    /// Re-fetches the key set after a token referenced an unknown key.
    ///
    /// `seen` is the set the caller looked the key up in. Nothing is
    /// re-fetched if it or the last refresh attempt is younger than the
    /// minimum refresh interval, or if another caller already replaced it.
    /// Only a successful fetch replaces the cached set; on failure `seen`
    /// is returned and stays cached.
    pub async fn refresh(&self, url: &str, seen: &Arc<KeySet>) -> Result<Arc<KeySet>, AuthError> {
        if seen.age() < self.min_refresh {
            return Ok(Arc::clone(seen));
        }
        if let Some(at) = self.refreshed_at.get(url).await {
            if at.elapsed() < self.min_refresh {
                return Ok(Arc::clone(seen));
            }
        }

        if let Some(CacheEntry::Ready(current)) = self.entries.get(url).await {
            if !Arc::ptr_eq(&current, seen) {
                return Ok(current);
            }
        }

        info!(url, "Refreshing JWKS after unknown key id");
        self.refreshed_at.insert(url.to_string(), Instant::now()).await;
        match load(Arc::clone(&self.fetcher), url).await {
            CacheEntry::Ready(fresh) => {
                self.entries
                    .insert(url.to_string(), CacheEntry::Ready(Arc::clone(&fresh)))
                    .await;
                Ok(fresh)
            }
            CacheEntry::Failed(reason) => {
                warn!(url, %reason, "Keeping cached JWKS after failed refresh");
                Ok(Arc::clone(seen))
            }
        }
    }
}

async fn load(fetcher: Arc<dyn KeySetFetcher>, url: &str) -> CacheEntry {
    match fetcher.fetch(url).await {
        Ok(set) => {
            if set.is_empty() {
                warn!(url, "JWKS contains no usable keys");
                return CacheEntry::Failed("key set contains no usable keys".to_string());
            }
            info!(url, keys = set.len(), "Cached JWKS");
            CacheEntry::Ready(Arc::new(set))
        }
        Err(e) => {
            warn!(url, error = %e, "Failed to fetch JWKS");
            CacheEntry::Failed(match e {
                AuthError::KeySetUnavailable(reason) => reason,
                other => other.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::jwks::key_set::VerificationKey;

    const URL: &str = "http://idp.test/jwks";

    #[derive(Debug, Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    #[async_trait]
    impl KeySetFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<KeySet, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(AuthError::KeySetUnavailable("connection refused".to_string()));
            }
            Ok(KeySet::new(vec![VerificationKey::hmac(
                Some("k1".to_string()),
                b"secret-key-1",
            )]))
        }
    }

    fn cache(fetcher: Arc<CountingFetcher>, failure_ttl: Duration) -> KeySetCache {
        KeySetCache::with_ttls(fetcher, Duration::from_secs(60), failure_ttl, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let fetcher = Arc::new(CountingFetcher::default());
        let cache = cache(Arc::clone(&fetcher), Duration::from_secs(1));

        let first = cache.get(URL).await.unwrap();
        let second = cache.get(URL).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let fetcher = Arc::new(CountingFetcher {
            delay: Duration::from_millis(50),
            ..Default::default()
        });
        let cache = cache(Arc::clone(&fetcher), Duration::from_secs(1));

        let lookups = (0..20).map(|_| {
            let cache = cache.clone();
            async move { cache.get(URL).await }
        });
        let results = futures::future::join_all(lookups).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_cached_briefly() {
        let fetcher = Arc::new(CountingFetcher {
            fail: true,
            ..Default::default()
        });
        let cache = cache(Arc::clone(&fetcher), Duration::from_millis(100));

        for _ in 0..3 {
            let err = cache.get(URL).await.unwrap_err();
            assert!(matches!(err, AuthError::KeySetUnavailable(_)));
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(cache.get(URL).await.is_err());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_key_set_is_unavailable() {
        #[derive(Debug)]
        struct EmptyFetcher;

        #[async_trait]
        impl KeySetFetcher for EmptyFetcher {
            async fn fetch(&self, _url: &str) -> Result<KeySet, AuthError> {
                Ok(KeySet::new(Vec::new()))
            }
        }

        let cache = KeySetCache::with_ttls(
            Arc::new(EmptyFetcher),
            Duration::from_secs(60),
            Duration::from_secs(1),
            Duration::ZERO,
        );
        let err = cache.get(URL).await.unwrap_err();
        assert!(matches!(err, AuthError::KeySetUnavailable(_)));
    }

    #[tokio::test]
    async fn test_refresh_respects_minimum_interval() {
        let fetcher = Arc::new(CountingFetcher::default());
        let cache = KeySetCache::with_ttls(
            Arc::clone(&fetcher) as Arc<dyn KeySetFetcher>,
            Duration::from_secs(60),
            Duration::from_secs(1),
            Duration::from_secs(60),
        );

        let seen = cache.get(URL).await.unwrap();
        let after = cache.refresh(URL, &seen).await.unwrap();

        assert!(Arc::ptr_eq(&seen, &after));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_refetches_stale_set() {
        let fetcher = Arc::new(CountingFetcher::default());
        let cache = cache(Arc::clone(&fetcher), Duration::from_secs(1));

        let seen = cache.get(URL).await.unwrap();
        let after = cache.refresh(URL, &seen).await.unwrap();

        assert!(!Arc::ptr_eq(&seen, &after));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    /// Serves one key set, then reports the identity provider as down.
    #[derive(Debug, Default)]
    struct FlakyFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl KeySetFetcher for FlakyFetcher {
        async fn fetch(&self, _url: &str) -> Result<KeySet, AuthError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(KeySet::new(vec![VerificationKey::hmac(
                    Some("k1".to_string()),
                    b"secret-key-1",
                )]));
            }
            Err(AuthError::KeySetUnavailable("503".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cached_set() {
        let fetcher = Arc::new(FlakyFetcher::default());
        let cache = KeySetCache::with_ttls(
            Arc::clone(&fetcher) as Arc<dyn KeySetFetcher>,
            Duration::from_secs(60),
            Duration::from_secs(60),
            Duration::ZERO,
        );

        let seen = cache.get(URL).await.unwrap();
        let after = cache.refresh(URL, &seen).await.unwrap();
        assert!(Arc::ptr_eq(&seen, &after));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);

        let current = cache.get(URL).await.unwrap();
        assert!(Arc::ptr_eq(&seen, &current));
        assert!(current.contains_kid("k1"));
    }

    #[tokio::test]
    async fn test_refresh_attempts_are_rate_limited() {
        let fetcher = Arc::new(FlakyFetcher::default());
        let cache = KeySetCache::with_ttls(
            Arc::clone(&fetcher) as Arc<dyn KeySetFetcher>,
            Duration::from_secs(60),
            Duration::from_secs(60),
            Duration::from_millis(100),
        );

        let seen = cache.get(URL).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        cache.refresh(URL, &seen).await.unwrap();
        cache.refresh(URL, &seen).await.unwrap();
        cache.refresh(URL, &seen).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.refresh(URL, &seen).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }
}
