//! Rankable item model and typed partial updates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ranking::core::config::EngagementThresholds;
use crate::ranking::core::errors::{RankingError, RankingResult};

/// Weighted engagement total: `likes + 2*comments + 3*shares`.
#[must_use]
pub const fn base_aggregate(likes: u64, comments: u64, shares: u64) -> u64 {
    likes
        .saturating_add(comments.saturating_mul(2))
        .saturating_add(shares.saturating_mul(3))
}

/// One content unit with engagement counters and a creation time.
///
/// Counters are only mutated through [`Item::apply`], which keeps
/// `base_aggregate` in step with `likes`, `comments` and `shares`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRecord")]
pub struct Item {
    id: String,
    likes: u64,
    comments: u64,
    shares: u64,
    upvotes: u64,
    downvotes: u64,
    created_at: f64,
    base_aggregate: u64,
}

impl Item {
    /// Create an item with all counters at zero.
    #[must_use]
    pub fn new(id: impl Into<String>, created_at: f64) -> Self {
        Self {
            id: id.into(),
            likes: 0,
            comments: 0,
            shares: 0,
            upvotes: 0,
            downvotes: 0,
            created_at,
            base_aggregate: 0,
        }
    }

    /// Builder: set likes.
    #[must_use]
    pub fn with_likes(mut self, likes: u64) -> Self {
        self.likes = likes;
        self.refresh_aggregate();
        self
    }

    /// Builder: set comments.
    #[must_use]
    pub fn with_comments(mut self, comments: u64) -> Self {
        self.comments = comments;
        self.refresh_aggregate();
        self
    }

    /// Builder: set shares.
    #[must_use]
    pub fn with_shares(mut self, shares: u64) -> Self {
        self.shares = shares;
        self.refresh_aggregate();
        self
    }

    /// Builder: set upvotes and downvotes.
    #[must_use]
    pub fn with_votes(mut self, upvotes: u64, downvotes: u64) -> Self {
        self.upvotes = upvotes;
        self.downvotes = downvotes;
        self
    }

    /// Item identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Like count.
    #[must_use]
    pub const fn likes(&self) -> u64 {
        self.likes
    }

    /// Comment count.
    #[must_use]
    pub const fn comments(&self) -> u64 {
        self.comments
    }

    /// Share count.
    #[must_use]
    pub const fn shares(&self) -> u64 {
        self.shares
    }

    /// Upvote count.
    #[must_use]
    pub const fn upvotes(&self) -> u64 {
        self.upvotes
    }

    /// Downvote count.
    #[must_use]
    pub const fn downvotes(&self) -> u64 {
        self.downvotes
    }

    /// Creation time in seconds since the Unix epoch.
    #[must_use]
    pub const fn created_at(&self) -> f64 {
        self.created_at
    }

    /// Derived `likes + 2*comments + 3*shares`.
    #[must_use]
    pub const fn base_aggregate(&self) -> u64 {
        self.base_aggregate
    }

    /// Seconds elapsed since creation, as seen from `now`.
    #[must_use]
    pub fn age_seconds(&self, now: f64) -> f64 {
        now - self.created_at
    }

    /// Apply the fields present in `update`, leaving the others untouched.
    pub fn apply(&mut self, update: &ItemUpdate) {
        if let Some(likes) = update.likes {
            self.likes = likes;
        }
        if let Some(comments) = update.comments {
            self.comments = comments;
        }
        if let Some(shares) = update.shares {
            self.shares = shares;
        }
        if let Some(upvotes) = update.upvotes {
            self.upvotes = upvotes;
        }
        if let Some(downvotes) = update.downvotes {
            self.downvotes = downvotes;
        }
        if update.touches_aggregate() {
            self.refresh_aggregate();
        }
    }

    /// Validate fields that the type system does not already guarantee.
    ///
    /// # Errors
    /// Returns an error if the id is empty or the creation time is not finite.
    pub fn validate(&self) -> RankingResult<()> {
        if self.id.is_empty() {
            return Err(RankingError::InvalidArgument(
                "item id must not be empty".to_string(),
            ));
        }

        if !self.created_at.is_finite() {
            return Err(RankingError::InvalidArgument(format!(
                "item {} has a non-finite created_at",
                self.id
            )));
        }

        Ok(())
    }

    /// Classify the item against engagement thresholds.
    #[must_use]
    pub const fn tier(&self, thresholds: &EngagementThresholds) -> EngagementTier {
        EngagementTier::classify(self, thresholds)
    }

    fn refresh_aggregate(&mut self) {
        self.base_aggregate = base_aggregate(self.likes, self.comments, self.shares);
    }
}

/// Plain field record used to deserialize items from external producers.
///
/// Omitted counters default to zero; `base_aggregate` is always derived.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRecord {
    /// Item identifier.
    pub id: String,
    /// Like count.
    pub likes: u64,
    /// Comment count.
    pub comments: u64,
    /// Share count.
    pub shares: u64,
    /// Upvote count.
    pub upvotes: u64,
    /// Downvote count.
    pub downvotes: u64,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: f64,
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        Self::new(record.id, record.created_at)
            .with_likes(record.likes)
            .with_comments(record.comments)
            .with_shares(record.shares)
            .with_votes(record.upvotes, record.downvotes)
    }
}

/// Sparse set of counter assignments; `None` fields are left unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemUpdate {
    /// New like count.
    pub likes: Option<u64>,
    /// New comment count.
    pub comments: Option<u64>,
    /// New share count.
    pub shares: Option<u64>,
    /// New upvote count.
    pub upvotes: Option<u64>,
    /// New downvote count.
    pub downvotes: Option<u64>,
}

impl ItemUpdate {
    /// Create an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set likes.
    #[must_use]
    pub const fn likes(mut self, likes: u64) -> Self {
        self.likes = Some(likes);
        self
    }

    /// Set comments.
    #[must_use]
    pub const fn comments(mut self, comments: u64) -> Self {
        self.comments = Some(comments);
        self
    }

    /// Set shares.
    #[must_use]
    pub const fn shares(mut self, shares: u64) -> Self {
        self.shares = Some(shares);
        self
    }

    /// Set upvotes.
    #[must_use]
    pub const fn upvotes(mut self, upvotes: u64) -> Self {
        self.upvotes = Some(upvotes);
        self
    }

    /// Set downvotes.
    #[must_use]
    pub const fn downvotes(mut self, downvotes: u64) -> Self {
        self.downvotes = Some(downvotes);
        self
    }

    /// Whether the update changes an input of `base_aggregate`.
    #[must_use]
    pub const fn touches_aggregate(&self) -> bool {
        self.likes.is_some() || self.comments.is_some() || self.shares.is_some()
    }

    /// Whether the update carries no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.touches_aggregate() && self.upvotes.is_none() && self.downvotes.is_none()
    }
}

/// Coarse engagement class of an item.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTier {
    /// At least one counter reaches the viral threshold.
    Viral,
    /// At least one counter reaches the high-engagement threshold.
    High,
    /// Neither high nor low.
    Normal,
    /// Every counter stays at or below the low-engagement threshold.
    Low,
}

impl EngagementTier {
    /// Classify an item; viral wins over high, high over low.
    #[must_use]
    pub const fn classify(item: &Item, thresholds: &EngagementThresholds) -> Self {
        let (likes, comments, shares) = (item.likes, item.comments, item.shares);
        if likes >= thresholds.viral_likes
            || comments >= thresholds.viral_comments
            || shares >= thresholds.viral_shares
        {
            Self::Viral
        } else if likes >= thresholds.high_likes
            || comments >= thresholds.high_comments
            || shares >= thresholds.high_shares
        {
            Self::High
        } else if likes <= thresholds.low_likes
            && comments <= thresholds.low_comments
            && shares <= thresholds.low_shares
        {
            Self::Low
        } else {
            Self::Normal
        }
    }

    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viral => "viral",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for EngagementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_creation_computes_aggregate() {
        let item = Item::new("test_123", 0.0)
            .with_likes(100)
            .with_comments(20)
            .with_shares(5);
        assert_eq!(item.id(), "test_123");
        assert_eq!(item.base_aggregate(), 100 + 20 * 2 + 5 * 3);
    }

    #[test]
    fn test_item_defaults() {
        let item = Item::new("empty", 42.0);
        assert_eq!(item.likes(), 0);
        assert_eq!(item.upvotes(), 0);
        assert_eq!(item.base_aggregate(), 0);
    }

    #[test]
    fn test_apply_recomputes_aggregate() {
        let mut item = Item::new("p", 0.0).with_likes(100).with_comments(20);
        item.apply(&ItemUpdate::new().likes(150).comments(30));
        assert_eq!(item.likes(), 150);
        assert_eq!(item.comments(), 30);
        assert_eq!(item.base_aggregate(), 150 + 30 * 2);
    }

    #[test]
    fn test_apply_leaves_missing_fields() {
        let mut item = Item::new("p", 0.0).with_likes(7).with_votes(3, 1);
        item.apply(&ItemUpdate::new().downvotes(2));
        assert_eq!(item.likes(), 7);
        assert_eq!(item.upvotes(), 3);
        assert_eq!(item.downvotes(), 2);
        assert_eq!(item.base_aggregate(), 7);
    }

    #[test]
    fn test_update_flags() {
        assert!(ItemUpdate::new().is_empty());
        assert!(!ItemUpdate::new().upvotes(1).touches_aggregate());
        assert!(ItemUpdate::new().shares(1).touches_aggregate());
    }

    #[test]
    fn test_record_deserialization_derives_aggregate() {
        let item: Item =
            serde_json::from_str(r#"{"id":"x","likes":1,"shares":2,"created_at":10.0}"#)
                .unwrap_or_else(|_| Item::new("bad", 0.0));
        assert_eq!(item.id(), "x");
        assert_eq!(item.base_aggregate(), 7);
    }

    #[test]
    fn test_update_rejects_unknown_fields() {
        let parsed: Result<ItemUpdate, _> = serde_json::from_str(r#"{"created_at": 1.0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validate_rejects_nan_timestamp() {
        assert!(Item::new("n", f64::NAN).validate().is_err());
        assert!(Item::new("", 1.0).validate().is_err());
        assert!(Item::new("ok", 1.0).validate().is_ok());
    }

    #[test]
    fn test_engagement_tiers() {
        let thresholds = EngagementThresholds::default();
        assert_eq!(
            Item::new("v", 0.0).with_likes(10_000).tier(&thresholds),
            EngagementTier::Viral
        );
        assert_eq!(
            Item::new("h", 0.0).with_comments(100).tier(&thresholds),
            EngagementTier::High
        );
        assert_eq!(
            Item::new("l", 0.0).with_likes(3).with_comments(1).tier(&thresholds),
            EngagementTier::Low
        );
        assert_eq!(
            Item::new("n", 0.0).with_likes(50).tier(&thresholds),
            EngagementTier::Normal
        );
    }
}
