//! Core types: items, configuration, clocks and errors.

pub mod clock;
pub mod config;
pub mod errors;
pub mod item;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, EngagementThresholds, Environment, RankingConfig, StreamingConfig};
pub use errors::{RankingError, RankingResult};
pub use item::{EngagementTier, Item, ItemRecord, ItemUpdate};
