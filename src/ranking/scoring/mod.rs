//! Scoring algorithms, parameters and scorer implementations.

pub mod algorithm;
pub mod formulas;
pub mod params;
pub mod scorer;

pub use algorithm::Algorithm;
pub use params::{DEFAULT_DECAY_RATE, HybridWeights, ParamFingerprint, ScoreParams};
pub use scorer::{ColumnarScorer, ScalarScorer, Scorer, ScorerKind};
