//! Recommendation cache
//!
//! Results are keyed by the set of leads and the team metrics they were
//! computed from, and expire after a fixed TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::trace;

/// Default entry lifetime (10 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Free-form team metrics that influence a recommendation
pub type TeamMetrics = Map<String, Value>;

/// Cache key for a lead set and optional team metrics.
///
/// Lead order does not matter. Absent metrics hash the same as empty ones.
pub fn cache_key<S: AsRef<str>>(lead_ids: &[S], team_metrics: Option<&TeamMetrics>) -> String {
    let mut leads: Vec<&str> = lead_ids.iter().map(AsRef::as_ref).collect();
    leads.sort_unstable();

    let metrics = team_metrics.cloned().unwrap_or_default();
    let payload = json!({ "leads": leads, "teamMetrics": metrics });

    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// TTL cache of recommendation results
pub struct RecommendationCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone + Send + Sync> Default for RecommendationCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> RecommendationCache<T> {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached result for the inputs, removing it if it has expired
    pub async fn get<S: AsRef<str>>(
        &self,
        lead_ids: &[S],
        team_metrics: Option<&TeamMetrics>,
    ) -> Option<T> {
        let key = cache_key(lead_ids, team_metrics);
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(&key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(&key);
            trace!(key = %key, "expired cache entry removed");
        }
        None
    }

    /// Store a result for the inputs
    pub async fn set<S: AsRef<str>>(
        &self,
        lead_ids: &[S],
        team_metrics: Option<&TeamMetrics>,
        value: T,
    ) {
        let key = cache_key(lead_ids, team_metrics);
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Number of entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, Value)]) -> TeamMetrics {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_key_ignores_lead_order() {
        assert_eq!(cache_key(&["b", "a", "c"], None), cache_key(&["c", "b", "a"], None));
    }

    #[test]
    fn test_key_absent_metrics_equal_empty() {
        let empty = TeamMetrics::new();
        assert_eq!(cache_key(&["a"], None), cache_key(&["a"], Some(&empty)));
    }

    #[test]
    fn test_key_depends_on_metrics() {
        let m = metrics(&[("openDeals", json!(4))]);
        assert_ne!(cache_key(&["a"], None), cache_key(&["a"], Some(&m)));
    }

    #[test]
    fn test_key_is_sha256_hex() {
        let key = cache_key(&["lead-1"], None);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let cache = RecommendationCache::new();
        assert!(cache.get(&["a"], None).await.is_none());

        cache.set(&["a", "b"], None, "top: a".to_string()).await;
        assert_eq!(cache.get(&["b", "a"], None).await.as_deref(), Some("top: a"));
        assert!(cache.get(&["a"], None).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_removed_on_read() {
        let cache = RecommendationCache::with_ttl(Duration::ZERO);
        cache.set(&["a"], None, 1u32).await;
        assert_eq!(cache.len().await, 1);

        assert!(cache.get(&["a"], None).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = RecommendationCache::with_ttl(Duration::ZERO);
        cache.set(&["a"], None, 1u32).await;
        cache.set(&["b"], None, 2u32).await;
        assert_eq!(cache.purge_expired().await, 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_default_ttl() {
        let cache: RecommendationCache<()> = RecommendationCache::default();
        assert_eq!(cache.ttl(), DEFAULT_CACHE_TTL);
    }
}
