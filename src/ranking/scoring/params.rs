//! Scoring parameters and their cache fingerprints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ranking::core::errors::{RankingError, RankingResult};
use crate::ranking::scoring::algorithm::Algorithm;

/// Default `time_decay` rate per second.
pub const DEFAULT_DECAY_RATE: f64 = 0.01;

/// Optional parameters shared by every algorithm.
///
/// Algorithms ignore the fields they do not read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreParams {
    /// Decay rate used by `time_decay`.
    pub decay_rate: f64,
    /// Weights used by `hybrid`.
    pub weights: HybridWeights,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            decay_rate: DEFAULT_DECAY_RATE,
            weights: HybridWeights::default(),
        }
    }
}

impl ScoreParams {
    /// Builder: set the `time_decay` rate.
    #[must_use]
    pub const fn with_decay_rate(mut self, decay_rate: f64) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    /// Builder: set the `hybrid` weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: HybridWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Reject non-finite parameters.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if any value is NaN or infinite.
    pub fn validate(&self) -> RankingResult<()> {
        if !self.decay_rate.is_finite() {
            return Err(RankingError::InvalidArgument(format!(
                "decay_rate must be finite, got {}",
                self.decay_rate
            )));
        }
        self.weights.validate()
    }

    /// Fingerprint of the parameters `algorithm` actually reads.
    #[must_use]
    pub const fn fingerprint(&self, algorithm: Algorithm) -> ParamFingerprint {
        match algorithm {
            Algorithm::HotScore | Algorithm::EngagementScore => ParamFingerprint::Unparameterized,
            Algorithm::TimeDecay => ParamFingerprint::DecayRate(self.decay_rate.to_bits()),
            Algorithm::Hybrid => ParamFingerprint::Weights([
                self.weights.likes.to_bits(),
                self.weights.comments.to_bits(),
                self.weights.shares.to_bits(),
                self.weights.time_decay.to_bits(),
            ]),
        }
    }
}

/// Weights for the `hybrid` algorithm.
///
/// Keys omitted from a JSON document or a weight map keep their default.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HybridWeights {
    /// Weight per like.
    pub likes: f64,
    /// Weight per comment.
    pub comments: f64,
    /// Weight per share.
    pub shares: f64,
    /// Exponential decay rate per second.
    pub time_decay: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            likes: 1.0,
            comments: 2.0,
            shares: 3.0,
            time_decay: 0.1,
        }
    }
}

impl HybridWeights {
    /// Build weights from a name → value map, defaulting missing keys.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for unknown keys or non-finite values.
    pub fn from_map<S: AsRef<str>>(map: &HashMap<S, f64>) -> RankingResult<Self> {
        let mut weights = Self::default();
        for (key, value) in map {
            let slot = match key.as_ref() {
                "likes" => &mut weights.likes,
                "comments" => &mut weights.comments,
                "shares" => &mut weights.shares,
                "time_decay" => &mut weights.time_decay,
                other => {
                    return Err(RankingError::InvalidArgument(format!(
                        "unknown hybrid weight: {other}"
                    )));
                }
            };
            *slot = *value;
        }
        weights.validate()?;
        Ok(weights)
    }

    /// Reject non-finite weights.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if any weight is NaN or infinite.
    pub fn validate(&self) -> RankingResult<()> {
        let named = [
            ("likes", self.likes),
            ("comments", self.comments),
            ("shares", self.shares),
            ("time_decay", self.time_decay),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(RankingError::InvalidArgument(format!(
                    "hybrid weight {name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Hashable digest of the parameters one algorithm reads.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParamFingerprint {
    /// The algorithm takes no parameters.
    Unparameterized,
    /// Bit pattern of the decay rate.
    DecayRate(u64),
    /// Bit patterns of likes, comments, shares and time-decay weights.
    Weights([u64; 4]),
}
