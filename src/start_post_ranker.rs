//! Startup helpers for the `post-ranker` benchmark binary.

use std::process::ExitCode;

use crate::ranking::core::clock::{Clock, SystemClock};
use crate::ranking::core::config::RankingConfig;
use crate::ranking::core::errors::{RankingError, RankingResult};
use crate::ranking::ingest::synthetic;
use crate::ranking::scoring::algorithm::Algorithm;
use crate::ranking::streaming::StreamingRanker;

/// Environment variable setting how many synthetic items each pass streams.
pub const ENV_BENCH_ITEMS: &str = "POST_RANKER_BENCH_ITEMS";

/// Items streamed per pass when `POST_RANKER_BENCH_ITEMS` is unset.
pub const DEFAULT_BENCH_ITEMS: u64 = 1_000_000;

/// Stream synthetic items through every algorithm and log throughput.
///
/// # Returns
/// `ExitCode::SUCCESS` when every pass completes, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting post-ranker v{}", env!("CARGO_PKG_VERSION"));

    let config = match RankingConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let items = match bench_items(|key| std::env::var(key).ok()) {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Invalid benchmark size: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = run_benchmark(&config, items) {
        tracing::error!("Benchmark failed: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Number of items per pass, read through `lookup`.
///
/// # Errors
/// Returns `InvalidConfig` if the value is not a positive integer.
pub fn bench_items<F>(lookup: F) -> RankingResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(ENV_BENCH_ITEMS) else {
        return Ok(DEFAULT_BENCH_ITEMS);
    };
    match raw.trim().parse::<u64>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(RankingError::InvalidConfig(format!(
            "{ENV_BENCH_ITEMS} must be a positive integer, got {raw:?}"
        ))),
    }
}

/// Run one streaming pass per algorithm over `items` synthetic items.
///
/// # Errors
/// Returns the first pass failure.
pub fn run_benchmark(config: &RankingConfig, items: u64) -> RankingResult<()> {
    let ranker = StreamingRanker::from_config(config);
    let top_k = config.streaming.top_k;
    let batch_size = config.streaming.batch_size;

    tracing::info!(
        items,
        top_k,
        batch_size,
        scorer = %config.scorer,
        "Benchmarking streaming selection"
    );

    for algorithm in Algorithm::ALL {
        let base_time = SystemClock.now();
        let result = ranker.rank_stream(
            synthetic::sequential_items(items, base_time),
            algorithm.as_str(),
            top_k,
            batch_size,
            &config.scoring,
        )?;

        let best = result.entries.first();
        tracing::info!(
            %algorithm,
            processed = result.total_processed,
            elapsed_ms = u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
            items_per_second = result.items_per_second().round(),
            peak = result.peak_structure_size,
            best_id = best.map_or("-", |entry| entry.item.id()),
            best_score = best.map_or(0.0, |entry| entry.score),
            "Pass complete"
        );
    }

    Ok(())
}
