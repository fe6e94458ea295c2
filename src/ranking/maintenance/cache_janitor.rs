//! Background sweeper for expired cached rankings.
//!
//! Expired rankings are never served, but they stay resident until the next
//! lookup of the same key. The janitor bounds that by sweeping periodically.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::ranking::engine::SharedRankingEngine;

/// Configuration for the cache janitor.
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    /// Interval between sweeps (in seconds).
    pub interval_seconds: u64,
    /// Whether the janitor runs at all.
    pub enabled: bool,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            enabled: true,
        }
    }
}

/// Statistics from one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JanitorStats {
    /// Expired rankings removed.
    pub expired_removed: usize,
    /// Rankings still cached after the sweep.
    pub remaining_entries: usize,
    /// Sweep duration in milliseconds.
    pub duration_ms: u64,
}

/// Periodic cache sweeper over a shared engine.
pub struct CacheJanitor {
    engine: SharedRankingEngine,
    config: JanitorConfig,
    shutdown: Arc<Notify>,
}

impl CacheJanitor {
    /// Create a janitor for `engine`.
    #[must_use]
    pub fn new(engine: SharedRankingEngine, config: JanitorConfig) -> Self {
        Self {
            engine,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Notifier that stops the janitor loop; call `notify_one` on it.
    #[must_use]
    pub fn shutdown_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Spawn the sweep loop as a tokio task.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        if !self.config.enabled {
            info!("Cache janitor is disabled");
            return;
        }

        let interval = Duration::from_secs(self.config.interval_seconds.max(1));
        info!(?interval, "Starting cache janitor");

        loop {
            tokio::select! {
                () = tokio::time::sleep(interval) => {
                    let stats = self.run_once().await;
                    if stats.expired_removed > 0 {
                        info!(
                            expired = stats.expired_removed,
                            remaining = stats.remaining_entries,
                            duration_ms = stats.duration_ms,
                            "Cache sweep completed"
                        );
                    } else {
                        debug!("Cache sweep found nothing to remove");
                    }
                }
                () = self.shutdown.notified() => {
                    info!("Cache janitor shutting down");
                    break;
                }
            }
        }
    }

    /// Run a single sweep.
    pub async fn run_once(&self) -> JanitorStats {
        let start = Instant::now();
        let engine = self.engine.read().await;
        let expired_removed = engine.cleanup_expired_cache();
        let remaining_entries = engine.cache_entries();
        drop(engine);

        JanitorStats {
            expired_removed,
            remaining_entries,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Builder for janitor configuration.
#[derive(Debug, Clone, Default)]
pub struct JanitorConfigBuilder {
    interval_seconds: Option<u64>,
    enabled: Option<bool>,
}

impl JanitorConfigBuilder {
    /// Create a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sweep interval in seconds.
    #[must_use]
    pub const fn interval_seconds(mut self, seconds: u64) -> Self {
        self.interval_seconds = Some(seconds);
        self
    }

    /// Enable or disable the janitor.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Build the janitor configuration.
    #[must_use]
    pub fn build(self) -> JanitorConfig {
        let default = JanitorConfig::default();
        JanitorConfig {
            interval_seconds: self.interval_seconds.unwrap_or(default.interval_seconds),
            enabled: self.enabled.unwrap_or(default.enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::core::clock::{Clock, ManualClock};
    use crate::ranking::core::config::RankingConfig;
    use crate::ranking::core::item::Item;
    use crate::ranking::engine::{RankingEngine, shared};
    use crate::ranking::scoring::params::ScoreParams;
    use crate::ranking::scoring::scorer::ScalarScorer;

    fn shared_engine(clock: &Arc<ManualClock>) -> Option<SharedRankingEngine> {
        let clock: Arc<dyn Clock> = clock.clone();
        let mut engine =
            RankingEngine::with_components(RankingConfig::default(), Arc::new(ScalarScorer), clock)
                .ok()?;
        engine.add_item(Item::new("p", 0.0).with_likes(3)).ok()?;
        engine
            .get_ranked("hot_score", 1, &ScoreParams::default())
            .ok()?;
        Some(shared(engine))
    }

    #[test]
    fn test_config_default() {
        let config = JanitorConfig::default();
        assert_eq!(config.interval_seconds, 30);
        assert!(config.enabled);
    }

    #[test]
    fn test_config_builder() {
        let config = JanitorConfigBuilder::new()
            .interval_seconds(5)
            .enabled(false)
            .build();
        assert_eq!(config.interval_seconds, 5);
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn test_run_once_removes_expired() {
        let clock = Arc::new(ManualClock::new(0.0));
        let engine = shared_engine(&clock);
        assert!(engine.is_some());
        let Some(engine) = engine else {
            return;
        };
        let janitor = CacheJanitor::new(engine, JanitorConfig::default());

        let fresh = janitor.run_once().await;
        assert_eq!(fresh.expired_removed, 0);
        assert_eq!(fresh.remaining_entries, 1);

        clock.advance(61.0);
        let swept = janitor.run_once().await;
        assert_eq!(swept.expired_removed, 1);
        assert_eq!(swept.remaining_entries, 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let clock = Arc::new(ManualClock::new(0.0));
        let Some(engine) = shared_engine(&clock) else {
            return;
        };
        let janitor = CacheJanitor::new(engine, JanitorConfigBuilder::new().interval_seconds(3_600).build());
        let shutdown = janitor.shutdown_notifier();
        let handle = janitor.spawn();
        shutdown.notify_one();
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_janitor_exits() {
        let clock = Arc::new(ManualClock::new(0.0));
        let Some(engine) = shared_engine(&clock) else {
            return;
        };
        let janitor = CacheJanitor::new(engine, JanitorConfigBuilder::new().enabled(false).build());
        assert!(janitor.spawn().await.is_ok());
    }
}
