//! Error types for the ranking subsystem.

use thiserror::Error;

/// Ranking subsystem error type.
#[derive(Debug, Error)]
pub enum RankingError {
    /// An item with the same id is already stored.
    #[error("item {0} already exists")]
    DuplicateItem(String),
    /// No item with the given id is stored.
    #[error("item {0} not found")]
    ItemNotFound(String),
    /// The algorithm name is not one of the registered algorithms.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    /// Malformed call parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Scoring produced NaN or an infinity.
    #[error("{algorithm} produced a non-finite score for item {id}")]
    NonFiniteScore {
        /// Algorithm being evaluated.
        algorithm: &'static str,
        /// Item that was being scored.
        id: String,
    },
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The item producer failed while a stream was being consumed.
    #[error("item producer failed: {0}")]
    Producer(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A streaming pass was cancelled between two batches.
    #[error("streaming pass cancelled after {processed} items")]
    Cancelled {
        /// Items consumed before the cancellation was observed.
        processed: u64,
    },
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for ranking operations.
pub type RankingResult<T> = Result<T, RankingError>;
