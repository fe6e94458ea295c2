//! Item producers.

pub mod synthetic;

pub use synthetic::{random_items, sequential_items};
