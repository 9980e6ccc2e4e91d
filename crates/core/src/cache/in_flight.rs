//! Short-lived claims on query hashes.
//!
//! Guards against starting a second identical ingest while one is still
//! running. Claims expire after a TTL so a failed run does not block the hash
//! forever; a successful run evicts its claim on completion.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// In-memory cache of in-flight query hashes.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct InFlightCache {
    entries: Arc<RwLock<HashMap<String, Instant>>>,
    ttl: Duration,
}

impl InFlightCache {
    /// Create a cache whose claims live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Claim `hash` unless a live claim already exists.
    ///
    /// Returns true if the caller now holds the claim.
    pub async fn try_claim(&self, hash: &str) -> bool {
        let mut entries = self.entries.write().await;
        if let Some(claimed_at) = entries.get(hash)
            && claimed_at.elapsed() < self.ttl
        {
            return false;
        }
        entries.insert(hash.to_string(), Instant::now());
        true
    }

    /// Whether a live claim exists for `hash`.
    pub async fn contains(&self, hash: &str) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(hash)
            .is_some_and(|claimed_at| claimed_at.elapsed() < self.ttl)
    }

    /// Drop any claim on `hash`. Returns true if one was present.
    pub async fn evict(&self, hash: &str) -> bool {
        self.entries.write().await.remove(hash).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let cache = InFlightCache::new(Duration::from_secs(60));
        assert!(cache.try_claim("abc").await);
        assert!(!cache.try_claim("abc").await);
        assert!(cache.try_claim("def").await);
        assert!(cache.contains("abc").await);
    }

    #[tokio::test]
    async fn test_evict_releases_claim() {
        let cache = InFlightCache::new(Duration::from_secs(60));
        cache.try_claim("abc").await;
        assert!(cache.evict("abc").await);
        assert!(!cache.evict("abc").await);
        assert!(!cache.contains("abc").await);
        assert!(cache.try_claim("abc").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_expires_after_ttl() {
        let cache = InFlightCache::new(Duration::from_secs(5));
        assert!(cache.try_claim("abc").await);

        tokio::time::advance(Duration::from_secs(6)).await;

        assert!(!cache.contains("abc").await);
        assert!(cache.try_claim("abc").await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache = InFlightCache::new(Duration::from_secs(60));
        let other = cache.clone();
        cache.try_claim("abc").await;
        assert!(other.contains("abc").await);
    }
}
