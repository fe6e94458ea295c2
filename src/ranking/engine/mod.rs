//! Resident ranking engine.

pub mod core;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use self::core::{EngineStats, RankedItem, RankingEngine};

/// Engine shared across tasks: writers take the lock exclusively, readers share it.
pub type SharedRankingEngine = Arc<RwLock<RankingEngine>>;

/// Wrap an engine for sharing across tasks.
#[must_use]
pub fn shared(engine: RankingEngine) -> SharedRankingEngine {
    Arc::new(RwLock::new(engine))
}
