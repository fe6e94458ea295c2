//! Binary entrypoint that runs the streaming ranking benchmark.

use std::process::ExitCode;

use post_ranker::start_post_ranker;

/// Stream synthetic items through every algorithm and log throughput.
fn main() -> ExitCode {
    start_post_ranker::run()
}
