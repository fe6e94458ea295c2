//! Resident item storage and ranking cache.

pub mod item_store;
pub mod ranking_cache;

pub use item_store::{ItemStore, StoreStats};
pub use ranking_cache::{CacheKey, RankingCache, ScoredId, SortedScores};
