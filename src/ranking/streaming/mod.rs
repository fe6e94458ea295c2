//! Bounded-memory streaming top-K selection.

pub mod selector;
pub mod top_k_heap;

pub use selector::{CancelFlag, RankedEntry, StreamingRanker, StreamingResult};
pub use top_k_heap::BoundedTopK;
