//! Time-bounded memoization of full rankings.

use std::cmp::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::ranking::core::config::CacheConfig;
use crate::ranking::scoring::algorithm::Algorithm;
use crate::ranking::scoring::params::ParamFingerprint;

/// One scored item id inside a cached ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredId {
    /// Score under the cached algorithm.
    pub score: f64,
    /// Item id.
    pub id: String,
}

/// Full ranking sorted by descending score.
pub type SortedScores = Arc<[ScoredId]>;

/// Cache key: the algorithm plus the parameters it reads.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CacheKey {
    /// Algorithm the ranking was computed with.
    pub algorithm: Algorithm,
    /// Fingerprint of the parameters that algorithm reads.
    pub params: ParamFingerprint,
}

/// Cache entry with its computation time.
#[derive(Clone)]
struct CacheEntry {
    scores: SortedScores,
    computed_at: f64,
}

impl CacheEntry {
    fn is_expired(&self, now: f64, ttl_seconds: f64) -> bool {
        // NaN ages count as expired.
        let age = now - self.computed_at;
        !matches!(age.partial_cmp(&ttl_seconds), Some(Ordering::Less))
    }
}

/// Ranking cache with wholesale invalidation.
///
/// Reads take `&self`; entries live in a `DashMap` so a query can fill the
/// cache without exclusive access to the owning engine.
pub struct RankingCache {
    config: CacheConfig,
    entries: DashMap<CacheKey, CacheEntry>,
}

impl RankingCache {
    /// Create a new cache with the given configuration.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    const fn ttl_seconds(&self) -> f64 {
        self.config.ttl_seconds as f64
    }

    /// Cached ranking for `key`, if one exists and is still valid at `now`.
    ///
    /// Expired entries are dropped on access.
    #[must_use]
    pub fn get(&self, key: &CacheKey, now: f64) -> Option<SortedScores> {
        if !self.config.enabled {
            return None;
        }

        let ttl = self.ttl_seconds();
        self.entries.get(key).and_then(|entry| {
            if entry.is_expired(now, ttl) {
                drop(entry);
                self.entries.remove(key);
                None
            } else {
                Some(Arc::clone(&entry.scores))
            }
        })
    }

    /// Store a ranking computed at `now`.
    pub fn insert(&self, key: CacheKey, scores: SortedScores, now: f64) {
        if !self.config.enabled {
            return;
        }

        self.enforce_max_entries(now);
        self.entries.insert(
            key,
            CacheEntry {
                scores,
                computed_at: now,
            },
        );
    }

    /// Drop every cached ranking.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Remove entries that are expired at `now` and return how many were removed.
    pub fn cleanup_expired(&self, now: f64) -> usize {
        let ttl = self.ttl_seconds();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        before.saturating_sub(self.entries.len())
    }

    /// Number of cached rankings, including ones that expired but were not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Make room for one more entry: expired entries go first, then arbitrary ones.
    fn enforce_max_entries(&self, now: f64) {
        if self.entries.len() < self.config.max_entries {
            return;
        }

        self.cleanup_expired(now);

        if self.entries.len() >= self.config.max_entries {
            let to_remove = self.entries.len() - self.config.max_entries + 1;
            let keys: Vec<CacheKey> = self
                .entries
                .iter()
                .take(to_remove)
                .map(|entry| *entry.key())
                .collect();
            for key in keys {
                self.entries.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(algorithm: Algorithm) -> CacheKey {
        CacheKey {
            algorithm,
            params: ParamFingerprint::Unparameterized,
        }
    }

    fn ranking(id: &str) -> SortedScores {
        Arc::from(vec![ScoredId {
            score: 1.0,
            id: id.to_string(),
        }])
    }

    #[test]
    fn test_entry_valid_until_ttl() {
        let cache = RankingCache::new(CacheConfig::default());
        cache.insert(key(Algorithm::HotScore), ranking("a"), 100.0);

        assert!(cache.get(&key(Algorithm::HotScore), 159.9).is_some());
        assert!(cache.get(&key(Algorithm::HotScore), 160.0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_all() {
        let cache = RankingCache::new(CacheConfig::default());
        cache.insert(key(Algorithm::HotScore), ranking("a"), 0.0);
        cache.insert(key(Algorithm::Hybrid), ranking("b"), 0.0);
        assert_eq!(cache.len(), 2);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_disabled() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let cache = RankingCache::new(config);
        cache.insert(key(Algorithm::HotScore), ranking("a"), 0.0);
        assert!(cache.get(&key(Algorithm::HotScore), 0.0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = RankingCache::new(CacheConfig::default());
        cache.insert(key(Algorithm::HotScore), ranking("a"), 0.0);
        cache.insert(key(Algorithm::Hybrid), ranking("b"), 50.0);
        assert_eq!(cache.cleanup_expired(70.0), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key(Algorithm::Hybrid), 70.0).is_some());
    }

    #[test]
    fn test_max_entries_bound() {
        let config = CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        };
        let cache = RankingCache::new(config);
        for algorithm in Algorithm::ALL {
            cache.insert(key(algorithm), ranking("a"), 0.0);
            assert!(cache.len() <= 2);
        }
        assert!(cache.get(&key(Algorithm::Hybrid), 0.0).is_some());
    }
}
