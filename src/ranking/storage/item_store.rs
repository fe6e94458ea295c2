//! Resident id → item store.

use std::collections::HashMap;

use serde::Serialize;

use crate::ranking::core::config::EngagementThresholds;
use crate::ranking::core::errors::{RankingError, RankingResult};
use crate::ranking::core::item::{EngagementTier, Item, ItemUpdate};

/// Mapping from item id to item. Insertion order has no ranking meaning.
#[derive(Clone, Debug, Default)]
pub struct ItemStore {
    items: HashMap<String, Item>,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new item.
    ///
    /// # Errors
    /// Returns `DuplicateItem` if the id is already stored, or `InvalidArgument`
    /// if the item fails validation. The store is unchanged on error.
    pub fn add(&mut self, item: Item) -> RankingResult<()> {
        item.validate()?;
        if self.items.contains_key(item.id()) {
            return Err(RankingError::DuplicateItem(item.id().to_string()));
        }
        self.items.insert(item.id().to_string(), item);
        Ok(())
    }

    /// Apply a partial update to a stored item and return the updated item.
    ///
    /// # Errors
    /// Returns `ItemNotFound` if the id is not stored.
    pub fn update(&mut self, id: &str, update: &ItemUpdate) -> RankingResult<&Item> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| RankingError::ItemNotFound(id.to_string()))?;
        item.apply(update);
        Ok(item)
    }

    /// Insert every item, overwriting stored items with the same id.
    ///
    /// Later items in the batch overwrite earlier ones. The whole batch is
    /// validated before anything is inserted.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if any item fails validation.
    pub fn batch_add<I>(&mut self, items: I) -> RankingResult<usize>
    where
        I: IntoIterator<Item = Item>,
    {
        let items: Vec<Item> = items.into_iter().collect();
        for item in &items {
            item.validate()?;
        }

        let count = items.len();
        self.items.reserve(count);
        for item in items {
            self.items.insert(item.id().to_string(), item);
        }
        Ok(count)
    }

    /// Remove and return a stored item.
    ///
    /// # Errors
    /// Returns `ItemNotFound` if the id is not stored.
    pub fn remove(&mut self, id: &str) -> RankingResult<Item> {
        self.items
            .remove(id)
            .ok_or_else(|| RankingError::ItemNotFound(id.to_string()))
    }

    /// Look up an item.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Whether an item with this id is stored.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over stored items in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Totals, averages and engagement tier counts over all items.
    #[must_use]
    pub fn stats(&self, thresholds: &EngagementThresholds) -> StoreStats {
        let mut stats = StoreStats {
            count: self.items.len(),
            ..StoreStats::default()
        };

        for item in self.items.values() {
            stats.total_likes = stats.total_likes.saturating_add(item.likes());
            stats.total_comments = stats.total_comments.saturating_add(item.comments());
            stats.total_shares = stats.total_shares.saturating_add(item.shares());
            stats.total_upvotes = stats.total_upvotes.saturating_add(item.upvotes());
            stats.total_downvotes = stats.total_downvotes.saturating_add(item.downvotes());
            match item.tier(thresholds) {
                EngagementTier::Viral => stats.viral_items += 1,
                EngagementTier::High => stats.high_engagement_items += 1,
                EngagementTier::Low => stats.low_engagement_items += 1,
                EngagementTier::Normal => {}
            }
        }

        stats.avg_likes = average(stats.total_likes, stats.count);
        stats.avg_comments = average(stats.total_comments, stats.count);
        stats.avg_shares = average(stats.total_shares, stats.count);
        stats.avg_upvotes = average(stats.total_upvotes, stats.count);
        stats.avg_downvotes = average(stats.total_downvotes, stats.count);
        stats
    }
}

#[allow(clippy::cast_precision_loss)]
fn average(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Read-only aggregates over the stored items.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StoreStats {
    /// Number of stored items.
    pub count: usize,
    /// Sum of likes.
    pub total_likes: u64,
    /// Sum of comments.
    pub total_comments: u64,
    /// Sum of shares.
    pub total_shares: u64,
    /// Sum of upvotes.
    pub total_upvotes: u64,
    /// Sum of downvotes.
    pub total_downvotes: u64,
    /// Mean likes per item.
    pub avg_likes: f64,
    /// Mean comments per item.
    pub avg_comments: f64,
    /// Mean shares per item.
    pub avg_shares: f64,
    /// Mean upvotes per item.
    pub avg_upvotes: f64,
    /// Mean downvotes per item.
    pub avg_downvotes: f64,
    /// Items in the viral tier.
    pub viral_items: usize,
    /// Items in the high-engagement tier.
    pub high_engagement_items: usize,
    /// Items in the low-engagement tier.
    pub low_engagement_items: usize,
}
