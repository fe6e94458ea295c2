//! Maintenance tasks for the ranking engine.

pub mod cache_janitor;

pub use cache_janitor::{CacheJanitor, JanitorConfig, JanitorConfigBuilder, JanitorStats};
