//! Registered scoring algorithms.
//!
//! The resident engine and the streaming selector both resolve algorithm
//! names through [`Algorithm::from_str`], so they accept exactly the same set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ranking::core::errors::RankingError;

/// A named scoring function.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Vote balance on a log scale plus a creation-time term.
    HotScore,
    /// Weighted engagement divided by age.
    EngagementScore,
    /// Base aggregate with exponential decay.
    TimeDecay,
    /// Custom-weighted engagement with exponential decay.
    Hybrid,
}

impl Algorithm {
    /// Every registered algorithm.
    pub const ALL: [Self; 4] = [
        Self::HotScore,
        Self::EngagementScore,
        Self::TimeDecay,
        Self::Hybrid,
    ];

    /// Stable name used on every public entry point.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HotScore => "hot_score",
            Self::EngagementScore => "engagement_score",
            Self::TimeDecay => "time_decay",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == s)
            .ok_or_else(|| RankingError::UnknownAlgorithm(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.as_str().parse::<Algorithm>().ok(), Some(algorithm));
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "not_a_real_algorithm".parse::<Algorithm>();
        assert!(matches!(err, Err(RankingError::UnknownAlgorithm(name)) if name == "not_a_real_algorithm"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!("Hot_Score".parse::<Algorithm>().is_err());
    }
}
