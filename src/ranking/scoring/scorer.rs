//! Scorer implementations.
//!
//! Two strategies evaluate the same kernels:
//! - [`ScalarScorer`] scores one item at a time.
//! - [`ColumnarScorer`] gathers a batch into column vectors first and runs
//!   each formula over whole columns.
//!
//! Callers validate [`ScoreParams`] once per pass; scorers assume valid input.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ranking::core::errors::{RankingError, RankingResult};
use crate::ranking::core::item::Item;
use crate::ranking::scoring::algorithm::Algorithm;
use crate::ranking::scoring::formulas;
use crate::ranking::scoring::params::ScoreParams;

/// Maps items to real-valued scores under a named algorithm.
pub trait Scorer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Score a single item.
    ///
    /// # Errors
    /// Returns `NonFiniteScore` if the formula yields NaN or an infinity.
    fn score(
        &self,
        algorithm: Algorithm,
        item: &Item,
        now: f64,
        params: &ScoreParams,
    ) -> RankingResult<f64>;

    /// Score a batch into `out`, replacing its previous contents.
    ///
    /// `out[i]` is the score of `items[i]`. The first failing item aborts the batch.
    ///
    /// # Errors
    /// Returns `NonFiniteScore` if any formula yields NaN or an infinity.
    fn score_batch(
        &self,
        algorithm: Algorithm,
        items: &[&Item],
        now: f64,
        params: &ScoreParams,
        out: &mut Vec<f64>,
    ) -> RankingResult<()> {
        out.clear();
        out.reserve(items.len());
        for item in items {
            out.push(self.score(algorithm, item, now, params)?);
        }
        Ok(())
    }
}

/// Which scorer implementation to build from configuration.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// [`ScalarScorer`].
    #[default]
    Scalar,
    /// [`ColumnarScorer`].
    Columnar,
}

impl ScorerKind {
    /// Build the scorer this kind names.
    #[must_use]
    pub fn build(self) -> Arc<dyn Scorer> {
        match self {
            Self::Scalar => Arc::new(ScalarScorer),
            Self::Columnar => Arc::new(ColumnarScorer),
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Columnar => write!(f, "columnar"),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
const fn as_f64(value: u64) -> f64 {
    value as f64
}

fn net_votes(item: &Item) -> f64 {
    as_f64(item.upvotes()) - as_f64(item.downvotes())
}

fn ensure_finite(algorithm: Algorithm, item: &Item, score: f64) -> RankingResult<f64> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(RankingError::NonFiniteScore {
            algorithm: algorithm.as_str(),
            id: item.id().to_string(),
        })
    }
}

/// Scores items one at a time.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarScorer;

impl Scorer for ScalarScorer {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn score(
        &self,
        algorithm: Algorithm,
        item: &Item,
        now: f64,
        params: &ScoreParams,
    ) -> RankingResult<f64> {
        let age = item.age_seconds(now);
        let aggregate = as_f64(item.base_aggregate());
        let score = match algorithm {
            Algorithm::HotScore => formulas::hot_score(net_votes(item), age),
            Algorithm::EngagementScore => formulas::engagement_score(aggregate, age),
            Algorithm::TimeDecay => formulas::time_decay(aggregate, age, params.decay_rate),
            Algorithm::Hybrid => formulas::hybrid(
                [
                    as_f64(item.likes()),
                    as_f64(item.comments()),
                    as_f64(item.shares()),
                ],
                age,
                &params.weights,
            ),
        };
        ensure_finite(algorithm, item, score)
    }
}

/// Scores batches column-wise.
///
/// Single-item calls go through a one-element batch.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColumnarScorer;

/// Structure-of-arrays view of one batch.
#[derive(Default)]
struct Columns {
    likes: Vec<f64>,
    comments: Vec<f64>,
    shares: Vec<f64>,
    aggregate: Vec<f64>,
    net_votes: Vec<f64>,
    age: Vec<f64>,
}

impl Columns {
    fn gather(items: &[&Item], now: f64, algorithm: Algorithm) -> Self {
        let mut columns = Self::default();
        columns.age = items.iter().map(|item| item.age_seconds(now)).collect();
        match algorithm {
            Algorithm::HotScore => {
                columns.net_votes = items.iter().map(|item| net_votes(item)).collect();
            }
            Algorithm::EngagementScore | Algorithm::TimeDecay => {
                columns.aggregate = items
                    .iter()
                    .map(|item| as_f64(item.base_aggregate()))
                    .collect();
            }
            Algorithm::Hybrid => {
                columns.likes = items.iter().map(|item| as_f64(item.likes())).collect();
                columns.comments = items.iter().map(|item| as_f64(item.comments())).collect();
                columns.shares = items.iter().map(|item| as_f64(item.shares())).collect();
            }
        }
        columns
    }

    fn evaluate(&self, algorithm: Algorithm, params: &ScoreParams, out: &mut Vec<f64>) {
        match algorithm {
            Algorithm::HotScore => out.extend(
                self.net_votes
                    .iter()
                    .zip(&self.age)
                    .map(|(&net, &age)| formulas::hot_score(net, age)),
            ),
            Algorithm::EngagementScore => out.extend(
                self.aggregate
                    .iter()
                    .zip(&self.age)
                    .map(|(&aggregate, &age)| formulas::engagement_score(aggregate, age)),
            ),
            Algorithm::TimeDecay => out.extend(
                self.aggregate
                    .iter()
                    .zip(&self.age)
                    .map(|(&aggregate, &age)| {
                        formulas::time_decay(aggregate, age, params.decay_rate)
                    }),
            ),
            Algorithm::Hybrid => out.extend((0..self.age.len()).map(|i| {
                formulas::hybrid(
                    [self.likes[i], self.comments[i], self.shares[i]],
                    self.age[i],
                    &params.weights,
                )
            })),
        }
    }
}

impl Scorer for ColumnarScorer {
    fn name(&self) -> &'static str {
        "columnar"
    }

    fn score(
        &self,
        algorithm: Algorithm,
        item: &Item,
        now: f64,
        params: &ScoreParams,
    ) -> RankingResult<f64> {
        let mut out = Vec::with_capacity(1);
        self.score_batch(algorithm, &[item], now, params, &mut out)?;
        Ok(out.first().copied().unwrap_or_default())
    }

    fn score_batch(
        &self,
        algorithm: Algorithm,
        items: &[&Item],
        now: f64,
        params: &ScoreParams,
        out: &mut Vec<f64>,
    ) -> RankingResult<()> {
        out.clear();
        if items.is_empty() {
            return Ok(());
        }

        out.reserve(items.len());
        Columns::gather(items, now, algorithm).evaluate(algorithm, params, out);

        for (item, &score) in items.iter().zip(out.iter()) {
            ensure_finite(algorithm, item, score)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: f64 = 1_700_000_000.0;

    fn sample_items() -> Vec<Item> {
        vec![
            Item::new("post1", NOW - 3_600.0)
                .with_likes(100)
                .with_comments(20)
                .with_shares(10)
                .with_votes(120, 5),
            Item::new("post2", NOW - 7_200.0)
                .with_likes(200)
                .with_comments(40)
                .with_shares(20)
                .with_votes(15, 40),
            Item::new("post3", NOW - 1_800.0)
                .with_likes(50)
                .with_comments(10)
                .with_shares(5),
            Item::new("future", NOW + 30.0).with_likes(3),
        ]
    }

    #[test]
    fn test_columnar_matches_scalar() {
        let items = sample_items();
        let refs: Vec<&Item> = items.iter().collect();
        let params = ScoreParams::default().with_decay_rate(0.001);

        for algorithm in Algorithm::ALL {
            let mut scalar = Vec::new();
            let mut columnar = Vec::new();
            let scalar_ok = ScalarScorer
                .score_batch(algorithm, &refs, NOW, &params, &mut scalar)
                .is_ok();
            let columnar_ok = ColumnarScorer
                .score_batch(algorithm, &refs, NOW, &params, &mut columnar)
                .is_ok();
            assert!(scalar_ok && columnar_ok);
            assert_eq!(scalar.len(), items.len());
            for (a, b) in scalar.iter().zip(&columnar) {
                assert!((a - b).abs() < 1e-9, "{algorithm}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_single_item_paths_agree() {
        let items = sample_items();
        let params = ScoreParams::default();
        for item in &items {
            let a = ScalarScorer.score(Algorithm::Hybrid, item, NOW, &params).ok();
            let b = ColumnarScorer.score(Algorithm::Hybrid, item, NOW, &params).ok();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_nan_timestamp_is_rejected() {
        let item = Item::new("broken", f64::NAN).with_likes(1);
        for scorer in [ScorerKind::Scalar.build(), ScorerKind::Columnar.build()] {
            let result = scorer.score(Algorithm::EngagementScore, &item, NOW, &ScoreParams::default());
            assert!(matches!(result, Err(RankingError::NonFiniteScore { ref id, .. }) if id == "broken"));
        }
    }

    #[test]
    fn test_hot_score_order_for_votes() {
        let created = NOW - 60.0;
        let up = Item::new("up", created).with_votes(50, 0);
        let down = Item::new("down", created).with_votes(0, 50);
        let params = ScoreParams::default();
        let up_score = ScalarScorer.score(Algorithm::HotScore, &up, NOW, &params).unwrap_or_default();
        let down_score = ScalarScorer.score(Algorithm::HotScore, &down, NOW, &params).unwrap_or_default();
        assert!(up_score > down_score);
    }

    #[test]
    fn test_scorer_kind_builds_named_scorer() {
        assert_eq!(ScorerKind::Scalar.build().name(), "scalar");
        assert_eq!(ScorerKind::Columnar.build().name(), "columnar");
    }
}
