//! Ranking engine orchestration.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::ranking::core::clock::{Clock, SystemClock};
use crate::ranking::core::config::RankingConfig;
use crate::ranking::core::errors::{RankingError, RankingResult};
use crate::ranking::core::item::{Item, ItemUpdate};
use crate::ranking::scoring::algorithm::Algorithm;
use crate::ranking::scoring::params::ScoreParams;
use crate::ranking::scoring::scorer::Scorer;
use crate::ranking::storage::item_store::{ItemStore, StoreStats};
use crate::ranking::storage::ranking_cache::{CacheKey, RankingCache, ScoredId, SortedScores};

/// Rough resident footprint of one item, in bytes.
const ITEM_FOOTPRINT_BYTES: usize = 200;
/// Rough footprint of one cached ranking, in bytes.
const CACHE_ENTRY_FOOTPRINT_BYTES: usize = 1_000;

/// One row of a ranked view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedItem {
    /// 1-based position.
    pub rank: usize,
    /// Item id.
    pub id: String,
    /// Score under the requested algorithm.
    pub score: f64,
    /// Current like count.
    pub likes: u64,
    /// Current comment count.
    pub comments: u64,
    /// Current share count.
    pub shares: u64,
    /// Current upvote count.
    pub upvotes: u64,
    /// Current downvote count.
    pub downvotes: u64,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: f64,
    /// `now - created_at` at query time.
    pub age_seconds: f64,
}

impl RankedItem {
    /// Age in hours.
    #[must_use]
    pub fn age_hours(&self) -> f64 {
        self.age_seconds / 3_600.0
    }
}

/// Engine statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EngineStats {
    /// Item aggregates.
    #[serde(flatten)]
    pub store: StoreStats,
    /// Number of cached rankings.
    pub cache_entries: usize,
    /// Estimated resident size in MB.
    pub estimated_memory_mb: f64,
}

/// Resident ranking engine: item store, scorer and ranking cache.
///
/// Mutations take `&mut self` and queries take `&self`; callers that share an
/// engine across tasks wrap it in a lock (see
/// [`SharedRankingEngine`](crate::ranking::engine::SharedRankingEngine)).
pub struct RankingEngine {
    config: RankingConfig,
    store: ItemStore,
    cache: RankingCache,
    scorer: Arc<dyn Scorer>,
    clock: Arc<dyn Clock>,
}

impl RankingEngine {
    /// Create an engine with the configured scorer and the system clock.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: RankingConfig) -> RankingResult<Self> {
        let scorer = config.scorer.build();
        Self::with_components(config, scorer, Arc::new(SystemClock))
    }

    /// Create an engine with an injected scorer and clock.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_components(
        config: RankingConfig,
        scorer: Arc<dyn Scorer>,
        clock: Arc<dyn Clock>,
    ) -> RankingResult<Self> {
        config.validate()?;
        let cache = RankingCache::new(config.cache.clone());

        info!(
            scorer = scorer.name(),
            ttl_seconds = config.cache.ttl_seconds,
            "Ranking engine ready"
        );

        Ok(Self {
            config,
            store: ItemStore::new(),
            cache,
            scorer,
            clock,
        })
    }

    /// Add a new item.
    ///
    /// # Errors
    /// Returns `DuplicateItem` if the id already exists.
    pub fn add_item(&mut self, item: Item) -> RankingResult<()> {
        self.store.add(item)?;
        self.invalidate_cache();
        Ok(())
    }

    /// Apply a partial update to an existing item.
    ///
    /// # Errors
    /// Returns `ItemNotFound` if the id does not exist.
    pub fn update_item(&mut self, id: &str, update: &ItemUpdate) -> RankingResult<()> {
        self.store.update(id, update)?;
        self.invalidate_cache();
        Ok(())
    }

    /// Add many items at once, overwriting existing ids.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if any item is malformed; nothing is inserted then.
    pub fn batch_add_items<I>(&mut self, items: I) -> RankingResult<usize>
    where
        I: IntoIterator<Item = Item>,
    {
        let count = self.store.batch_add(items)?;
        self.invalidate_cache();
        debug!(count, "Batch added items");
        Ok(count)
    }

    /// Remove an item.
    ///
    /// # Errors
    /// Returns `ItemNotFound` if the id does not exist.
    pub fn remove_item(&mut self, id: &str) -> RankingResult<Item> {
        let item = self.store.remove(id)?;
        self.invalidate_cache();
        Ok(item)
    }

    /// Look up an item.
    #[must_use]
    pub fn get_item(&self, id: &str) -> Option<&Item> {
        self.store.get(id)
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the engine holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Scoring parameters from the configuration.
    #[must_use]
    pub const fn default_params(&self) -> &ScoreParams {
        &self.config.scoring
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Top `limit` items under `algorithm`, best first.
    ///
    /// # Errors
    /// Returns `UnknownAlgorithm`, `InvalidArgument` for bad parameters, or the
    /// first scoring failure.
    pub fn get_ranked(
        &self,
        algorithm: &str,
        limit: usize,
        params: &ScoreParams,
    ) -> RankingResult<Vec<RankedItem>> {
        let algorithm: Algorithm = algorithm.parse()?;
        params.validate()?;
        let now = self.clock.now();
        let ranking = self.ranking(algorithm, params, now)?;

        let ranked = ranking
            .iter()
            .take(limit)
            .enumerate()
            .filter_map(|(index, scored)| {
                self.store.get(&scored.id).map(|item| RankedItem {
                    rank: index + 1,
                    id: scored.id.clone(),
                    score: scored.score,
                    likes: item.likes(),
                    comments: item.comments(),
                    shares: item.shares(),
                    upvotes: item.upvotes(),
                    downvotes: item.downvotes(),
                    created_at: item.created_at(),
                    age_seconds: item.age_seconds(now),
                })
            })
            .collect();

        Ok(ranked)
    }

    /// 1-based position of `id` under `algorithm`, or `None` if it is not stored.
    ///
    /// # Errors
    /// Same as [`RankingEngine::get_ranked`].
    pub fn get_rank(
        &self,
        id: &str,
        algorithm: &str,
        params: &ScoreParams,
    ) -> RankingResult<Option<usize>> {
        let algorithm: Algorithm = algorithm.parse()?;
        params.validate()?;
        let ranking = self.ranking(algorithm, params, self.clock.now())?;
        Ok(ranking
            .iter()
            .position(|scored| scored.id == id)
            .map(|index| index + 1))
    }

    /// Like [`RankingEngine::get_rank`] but an absent id is an error.
    ///
    /// # Errors
    /// Returns `ItemNotFound` if the id is not stored.
    pub fn require_rank(
        &self,
        id: &str,
        algorithm: &str,
        params: &ScoreParams,
    ) -> RankingResult<usize> {
        self.get_rank(id, algorithm, params)?
            .ok_or_else(|| RankingError::ItemNotFound(id.to_string()))
    }

    /// Item aggregates plus cache and memory figures.
    #[must_use]
    pub fn get_stats(&self) -> EngineStats {
        let store = self.store.stats(&self.config.engagement);
        let cache_entries = self.cache.len();
        let bytes = store.count * ITEM_FOOTPRINT_BYTES + cache_entries * CACHE_ENTRY_FOOTPRINT_BYTES;
        #[allow(clippy::cast_precision_loss)]
        let estimated_memory_mb = bytes as f64 / (1024.0 * 1024.0);

        EngineStats {
            store,
            cache_entries,
            estimated_memory_mb,
        }
    }

    /// Number of cached rankings.
    #[must_use]
    pub fn cache_entries(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached ranking.
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Drop cached rankings that have expired and return how many were removed.
    pub fn cleanup_expired_cache(&self) -> usize {
        self.cache.cleanup_expired(self.clock.now())
    }

    fn invalidate_cache(&self) {
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), "Invalidating ranking cache");
        }
        self.cache.invalidate_all();
    }

    fn ranking(
        &self,
        algorithm: Algorithm,
        params: &ScoreParams,
        now: f64,
    ) -> RankingResult<SortedScores> {
        let key = CacheKey {
            algorithm,
            params: params.fingerprint(algorithm),
        };

        if let Some(cached) = self.cache.get(&key, now) {
            debug!(%algorithm, "Ranking cache hit");
            return Ok(cached);
        }

        let ranking: SortedScores = self.compute_scores(algorithm, params, now)?.into();
        self.cache.insert(key, Arc::clone(&ranking), now);
        debug!(%algorithm, items = ranking.len(), "Ranking computed");
        Ok(ranking)
    }

    fn compute_scores(
        &self,
        algorithm: Algorithm,
        params: &ScoreParams,
        now: f64,
    ) -> RankingResult<Vec<ScoredId>> {
        let items: Vec<&Item> = self.store.iter().collect();
        let mut scores = Vec::with_capacity(items.len());
        self.scorer
            .score_batch(algorithm, &items, now, params, &mut scores)?;

        let mut ranking: Vec<ScoredId> = items
            .iter()
            .zip(scores)
            .map(|(item, score)| ScoredId {
                score,
                id: item.id().to_string(),
            })
            .collect();
        ranking.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        Ok(ranking)
    }
}
