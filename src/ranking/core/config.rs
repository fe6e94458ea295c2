//! Configuration for the ranking subsystem.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ranking::core::errors::{RankingError, RankingResult};
use crate::ranking::scoring::params::ScoreParams;
use crate::ranking::scoring::scorer::ScorerKind;

/// Environment variable selecting a preset.
pub const ENV_PRESET: &str = "POST_RANKER_ENV";
/// Environment variable overriding the cache TTL in seconds.
pub const ENV_CACHE_TTL: &str = "POST_RANKER_CACHE_TTL";
/// Environment variable overriding the streaming batch size.
pub const ENV_BATCH_SIZE: &str = "POST_RANKER_BATCH_SIZE";

/// Top-level configuration for the ranking engine and streaming selector.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Preset the configuration was derived from, if any.
    pub environment: Option<Environment>,
    /// Ranking cache settings.
    pub cache: CacheConfig,
    /// Streaming selector settings.
    pub streaming: StreamingConfig,
    /// Default scoring parameters.
    pub scoring: ScoreParams,
    /// Engagement tier thresholds used by statistics.
    pub engagement: EngagementThresholds,
    /// Scorer implementation to build.
    pub scorer: ScorerKind,
}

impl RankingConfig {
    /// Build the preset for an environment.
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        let mut config = Self {
            environment: Some(environment),
            ..Self::default()
        };
        config.cache.ttl_seconds = environment.cache_ttl_seconds();
        config
    }

    /// Build a configuration from process environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable cannot be parsed or the result is invalid.
    pub fn from_env() -> RankingResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Reads [`ENV_PRESET`], [`ENV_CACHE_TTL`] and [`ENV_BATCH_SIZE`].
    ///
    /// # Errors
    /// Returns an error if a value cannot be parsed or the result is invalid.
    pub fn from_lookup<F>(lookup: F) -> RankingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_PRESET) {
            Some(name) => Self::for_environment(name.parse()?),
            None => Self::default(),
        };

        if let Some(raw) = lookup(ENV_CACHE_TTL) {
            config.cache.ttl_seconds = parse_number(ENV_CACHE_TTL, &raw)?;
        }

        if let Some(raw) = lookup(ENV_BATCH_SIZE) {
            config.streaming.batch_size = parse_number(ENV_BATCH_SIZE, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json_str(raw: &str) -> RankingResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> RankingResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> RankingResult<()> {
        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(RankingError::InvalidConfig(
                "cache.ttl_seconds must be > 0 when caching is enabled".to_string(),
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(RankingError::InvalidConfig(
                "cache.max_entries must be > 0".to_string(),
            ));
        }

        if self.streaming.batch_size == 0 {
            return Err(RankingError::InvalidConfig(
                "streaming.batch_size must be > 0".to_string(),
            ));
        }

        if self.streaming.top_k == 0 {
            return Err(RankingError::InvalidConfig(
                "streaming.top_k must be > 0".to_string(),
            ));
        }

        if self.streaming.progress_every_batches == 0 {
            return Err(RankingError::InvalidConfig(
                "streaming.progress_every_batches must be > 0".to_string(),
            ));
        }

        self.scoring
            .validate()
            .map_err(|err| RankingError::InvalidConfig(format!("scoring: {err}")))
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> RankingResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| RankingError::InvalidConfig(format!("{key} is not a number: {raw:?}")))
}

/// Deployment preset.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Short cache.
    Development,
    /// Very short cache.
    Testing,
    /// Long cache.
    Production,
}

impl Environment {
    /// Cache TTL used by the preset.
    #[must_use]
    pub const fn cache_ttl_seconds(self) -> u64 {
        match self {
            Self::Development => 30,
            Self::Testing => 5,
            Self::Production => 300,
        }
    }

    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "testing" | "test" => Ok(Self::Testing),
            "production" | "prod" => Ok(Self::Production),
            other => Err(RankingError::InvalidConfig(format!(
                "unknown environment: {other}"
            ))),
        }
    }
}

/// Ranking cache settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether rankings are memoized at all.
    pub enabled: bool,
    /// Lifetime of a cached ranking in seconds.
    pub ttl_seconds: u64,
    /// Maximum number of cached rankings.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 60,
            max_entries: 10_000,
        }
    }
}

/// Streaming selector settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Items pulled and scored per batch.
    pub batch_size: usize,
    /// Default number of items to keep.
    pub top_k: usize,
    /// Emit an `info` progress line every N batches.
    pub progress_every_batches: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            batch_size: 100_000,
            top_k: 100,
            progress_every_batches: 10,
        }
    }
}

/// Thresholds for [`EngagementTier`](crate::ranking::core::item::EngagementTier).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementThresholds {
    /// Likes at or above which an item is viral.
    pub viral_likes: u64,
    /// Comments at or above which an item is viral.
    pub viral_comments: u64,
    /// Shares at or above which an item is viral.
    pub viral_shares: u64,
    /// Likes at or above which engagement is high.
    pub high_likes: u64,
    /// Comments at or above which engagement is high.
    pub high_comments: u64,
    /// Shares at or above which engagement is high.
    pub high_shares: u64,
    /// Likes at or below which engagement is low.
    pub low_likes: u64,
    /// Comments at or below which engagement is low.
    pub low_comments: u64,
    /// Shares at or below which engagement is low.
    pub low_shares: u64,
}

impl Default for EngagementThresholds {
    fn default() -> Self {
        Self {
            viral_likes: 10_000,
            viral_comments: 500,
            viral_shares: 1_000,
            high_likes: 1_000,
            high_comments: 100,
            high_shares: 200,
            low_likes: 10,
            low_comments: 1,
            low_shares: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RankingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.streaming.batch_size, 100_000);
        assert_eq!(config.scorer, ScorerKind::Scalar);
    }

    #[test]
    fn test_environment_presets() {
        assert_eq!(
            RankingConfig::for_environment(Environment::Testing).cache.ttl_seconds,
            5
        );
        assert_eq!(
            RankingConfig::for_environment(Environment::Production).cache.ttl_seconds,
            300
        );
        assert_eq!(
            RankingConfig::for_environment(Environment::Development).cache.ttl_seconds,
            30
        );
    }

    #[test]
    fn test_presets_keep_default_batch_size() {
        for environment in [Environment::Development, Environment::Testing, Environment::Production] {
            let config = RankingConfig::for_environment(environment);
            assert_eq!(config.streaming.batch_size, StreamingConfig::default().batch_size);
        }
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_PRESET, "prod"),
            (ENV_BATCH_SIZE, "2048"),
        ]);
        let config = RankingConfig::from_lookup(|key| vars.get(key).map(ToString::to_string));
        let config = config.unwrap_or_default();
        assert_eq!(config.environment, Some(Environment::Production));
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.streaming.batch_size, 2048);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = RankingConfig::from_lookup(|key| {
            (key == ENV_CACHE_TTL).then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(RankingError::InvalidConfig(_))));

        let result = RankingConfig::from_lookup(|key| {
            (key == ENV_PRESET).then(|| "staging".to_string())
        });
        assert!(matches!(result, Err(RankingError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_partial() {
        let config = RankingConfig::from_json_str(
            r#"{"cache": {"ttl_seconds": 5}, "scorer": "columnar", "scoring": {"decay_rate": 0.2}}"#,
        )
        .unwrap_or_default();
        assert_eq!(config.cache.ttl_seconds, 5);
        assert!(config.cache.enabled);
        assert_eq!(config.scorer, ScorerKind::Columnar);
        assert!((config.scoring.decay_rate - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = RankingConfig::default();
        config.cache.ttl_seconds = 0;
        assert!(config.validate().is_err());

        config.cache.enabled = false;
        assert!(config.validate().is_ok());

        config.streaming.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scoring() {
        let mut config = RankingConfig::default();
        config.scoring.decay_rate = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(RankingError::InvalidConfig(_))
        ));
    }
}
