//! Integration helpers for embedding the ranking subsystem.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, init_tracing_with};
