//! Social-post ranking subsystem.
//!
//! This module is organized into:
//! - `core`: Items, configuration, clocks and errors
//! - `scoring`: Algorithms, parameters and scorer implementations
//! - `storage`: Item store and TTL ranking cache
//! - `engine`: Resident ranking engine
//! - `streaming`: Bounded-memory top-K selection over item streams
//! - `ingest`: Synthetic item producers
//! - `maintenance`: Background cache sweeping
//! - `adapters`: Tracing setup

pub mod adapters;
pub mod core;
pub mod engine;
pub mod ingest;
pub mod maintenance;
pub mod scoring;
pub mod storage;
pub mod streaming;

// Re-export commonly used types for convenience
pub use self::core::{
    CacheConfig, Clock, EngagementThresholds, EngagementTier, Environment, Item, ItemRecord,
    ItemUpdate, ManualClock, RankingConfig, RankingError, RankingResult, StreamingConfig,
    SystemClock,
};
pub use adapters::{init_tracing, init_tracing_with};
pub use engine::{EngineStats, RankedItem, RankingEngine, SharedRankingEngine, shared};
pub use ingest::{random_items, sequential_items};
pub use maintenance::{CacheJanitor, JanitorConfig, JanitorConfigBuilder, JanitorStats};
pub use scoring::{
    Algorithm, ColumnarScorer, DEFAULT_DECAY_RATE, HybridWeights, ParamFingerprint, ScalarScorer,
    ScoreParams, Scorer, ScorerKind,
};
pub use storage::{CacheKey, ItemStore, RankingCache, ScoredId, SortedScores, StoreStats};
pub use streaming::{BoundedTopK, CancelFlag, RankedEntry, StreamingRanker, StreamingResult};
