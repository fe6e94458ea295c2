//! Scoring kernels.
//!
//! Every kernel is a pure function of plain numbers so that the per-item and
//! the columnar scorers share one definition of each formula.

use crate::ranking::scoring::params::HybridWeights;

/// Reference epoch subtracted by `hot_score`.
pub const HOT_EPOCH_OFFSET: f64 = 1_134_028_003.0;
/// Divisor applied to the `hot_score` time term.
pub const HOT_TIME_SCALE: f64 = 45_000.0;
/// `hot_score` is rounded to this many decimal places.
pub const HOT_DECIMALS: i32 = 7;

/// Age used by the decaying formulas; negative ages count as zero.
///
/// NaN is passed through so malformed timestamps surface as non-finite scores.
#[must_use]
pub fn decay_age(age: f64) -> f64 {
    if age < 0.0 { 0.0 } else { age }
}

/// Reddit-style hot score.
///
/// `net_votes` is `upvotes - downvotes`; `age` is `now - created_at`.
#[must_use]
pub fn hot_score(net_votes: f64, age: f64) -> f64 {
    let sign: f64 = if net_votes > 0.0 {
        1.0
    } else if net_votes < 0.0 {
        -1.0
    } else {
        0.0
    };
    let order = net_votes.abs().max(1.0).log10();
    let seconds = age - HOT_EPOCH_OFFSET;
    round_to(sign.mul_add(order, seconds / HOT_TIME_SCALE), HOT_DECIMALS)
}

/// Weighted engagement per second of age, with a denominator floor of one.
#[must_use]
pub fn engagement_score(base_aggregate: f64, age: f64) -> f64 {
    base_aggregate / (decay_age(age) + 1.0)
}

/// Base aggregate with exponential decay.
#[must_use]
pub fn time_decay(base_aggregate: f64, age: f64, decay_rate: f64) -> f64 {
    base_aggregate * (-decay_rate * decay_age(age)).exp()
}

/// Custom-weighted engagement with exponential decay.
#[must_use]
pub fn hybrid(counters: [f64; 3], age: f64, weights: &HybridWeights) -> f64 {
    let [likes, comments, shares] = counters;
    let engagement = shares.mul_add(
        weights.shares,
        comments.mul_add(weights.comments, likes * weights.likes),
    );
    engagement * (-weights.time_decay * decay_age(age)).exp()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_score_sign_and_order() {
        let age = 3_600.0;
        let time_term = (age - HOT_EPOCH_OFFSET) / HOT_TIME_SCALE;
        assert!((hot_score(100.0, age) - (2.0 + time_term)).abs() < 1e-6);
        assert!((hot_score(-100.0, age) - (-2.0 + time_term)).abs() < 1e-6);
        assert!((hot_score(0.0, age) - time_term).abs() < 1e-6);
    }

    #[test]
    fn test_hot_score_is_rounded() {
        let score = hot_score(115.0, 1_234.5678);
        let scaled = score * 1e7;
        assert!((scaled - scaled.round()).abs() < 1e-3);
    }

    #[test]
    fn test_engagement_floor() {
        assert!((engagement_score(140.0, 0.0) - 140.0).abs() < f64::EPSILON);
        assert!((engagement_score(140.0, -5.0) - 140.0).abs() < f64::EPSILON);
        assert!((engagement_score(140.0, 9.0) - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_time_decay_suppresses_older() {
        let fresh = time_decay(100.0, 10.0, 0.01);
        let stale = time_decay(100.0, 1_000.0, 0.01);
        assert!(fresh > stale);
        assert!((time_decay(100.0, 0.0, 0.5) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hybrid_defaults_match_base_aggregate_at_zero_age() {
        let weights = HybridWeights::default();
        let score = hybrid([10.0, 2.0, 1.0], 0.0, &weights);
        assert!((score - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_future_dated_items_do_not_grow() {
        let weights = HybridWeights::default();
        assert!((time_decay(10.0, -50.0, 0.01) - 10.0).abs() < f64::EPSILON);
        assert!((time_decay(10.0, -50.0, 0.01) - time_decay(10.0, 0.0, 0.01)).abs() < f64::EPSILON);
        assert!((hybrid([1.0, 1.0, 1.0], -50.0, &weights) - 6.0).abs() < 1e-9);
        assert!(hybrid([1.0, 1.0, 1.0], -50.0, &weights) <= hybrid([1.0, 1.0, 1.0], 0.0, &weights));
    }

    #[test]
    fn test_nan_age_propagates() {
        assert!(engagement_score(1.0, f64::NAN).is_nan());
        assert!(time_decay(1.0, f64::NAN, 0.01).is_nan());
    }
}
