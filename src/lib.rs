//! Social-post ranking: pluggable scorers, a resident engine with a TTL ranking
//! cache, and a bounded-memory streaming top-K selector.

// Safety and documentation
#![deny(warnings)] // Every warning is an error
#![deny(unsafe_code)] // No unsafe code
#![deny(missing_docs)] // Every public item is documented
#![deny(dead_code)] // No unused code
#![deny(unused_imports)]
#![deny(unused_variables)]
#![deny(unused_must_use)] // Results and options are handled explicitly
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![deny(overflowing_literals)]

// Clippy discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)] // No unwrap()
#![deny(clippy::expect_used)] // No expect()
#![deny(clippy::panic)] // No panic!()
#![deny(clippy::print_stdout)] // Log through tracing, never println!()
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)] // const wherever possible
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]
#![allow(clippy::module_name_repetitions)]

/// Ranking engine, scorers and streaming selection.
pub mod ranking;
/// Entry helpers for the `post-ranker` binary.
pub mod start_post_ranker;
