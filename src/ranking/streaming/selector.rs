//! Streaming top-K selection over arbitrarily long item sequences.
//!
//! A pass consumes its input in batches, scores each batch with the configured
//! [`Scorer`], and offers every score to a [`BoundedTopK`]. At most
//! `top_k + batch_size` items are resident at any time.

use std::convert::Infallible;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use futures::{Stream, StreamExt, pin_mut};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ranking::core::clock::{Clock, SystemClock};
use crate::ranking::core::config::RankingConfig;
use crate::ranking::core::errors::{RankingError, RankingResult};
use crate::ranking::core::item::Item;
use crate::ranking::scoring::algorithm::Algorithm;
use crate::ranking::scoring::params::ScoreParams;
use crate::ranking::scoring::scorer::Scorer;
use crate::ranking::streaming::top_k_heap::BoundedTopK;

/// Upper bound on the batch buffer reserved up front.
const MAX_BATCH_PREALLOC: usize = 65_536;

/// Default number of batches between `info` progress lines.
const DEFAULT_PROGRESS_EVERY_BATCHES: u64 = 10;

/// Shared flag that asks a running pass to stop at the next batch boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One selected item with its score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedEntry {
    /// Score under the pass algorithm.
    pub score: f64,
    /// The selected item.
    pub item: Item,
}

/// Outcome of a streaming pass.
#[derive(Clone, Debug, Serialize)]
pub struct StreamingResult {
    /// Algorithm used for the pass.
    pub algorithm: Algorithm,
    /// Selected items, best first.
    pub entries: Vec<RankedEntry>,
    /// Items consumed from the input.
    pub total_processed: u64,
    /// Batches scored.
    pub batches_processed: u64,
    /// Requested K.
    pub top_k: usize,
    /// Requested batch size.
    pub batch_size: usize,
    /// Largest number of items resident at once (heap plus pending batch).
    pub peak_structure_size: usize,
    /// Wall time of the pass.
    pub elapsed: Duration,
}

impl StreamingResult {
    /// Ids of the selected items, best first.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.item.id()).collect()
    }

    /// Throughput of the pass.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn items_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.total_processed as f64 / seconds
        } else {
            0.0
        }
    }
}

/// Streaming top-K selector.
///
/// Holds no state between passes; one selector can run any number of passes,
/// including concurrently.
pub struct StreamingRanker {
    scorer: Arc<dyn Scorer>,
    clock: Arc<dyn Clock>,
    progress_every_batches: u64,
    cancel: Option<CancelFlag>,
}

impl StreamingRanker {
    /// Create a selector with an injected scorer and clock.
    #[must_use]
    pub fn new(scorer: Arc<dyn Scorer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scorer,
            clock,
            progress_every_batches: DEFAULT_PROGRESS_EVERY_BATCHES,
            cancel: None,
        }
    }

    /// Create a selector from configuration, using the system clock.
    #[must_use]
    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.scorer.build(), Arc::new(SystemClock))
            .with_progress_every(config.streaming.progress_every_batches)
    }

    /// Builder: log an `info` progress line every `batches` batches.
    #[must_use]
    pub fn with_progress_every(mut self, batches: u64) -> Self {
        self.progress_every_batches = if batches == 0 { 1 } else { batches };
        self
    }

    /// Builder: observe `flag` between batches.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Select the `top_k` best items of `items` under `algorithm`.
    ///
    /// # Errors
    /// Returns `UnknownAlgorithm`, `InvalidArgument` for a zero `top_k` or
    /// `batch_size` or bad parameters, `NonFiniteScore`, or `Cancelled`.
    pub fn rank_stream<I>(
        &self,
        items: I,
        algorithm: &str,
        top_k: usize,
        batch_size: usize,
        params: &ScoreParams,
    ) -> RankingResult<StreamingResult>
    where
        I: IntoIterator<Item = Item>,
    {
        self.try_rank_stream(
            items.into_iter().map(Ok::<Item, Infallible>),
            algorithm,
            top_k,
            batch_size,
            params,
        )
    }

    /// Like [`StreamingRanker::rank_stream`] over a fallible producer.
    ///
    /// # Errors
    /// As [`StreamingRanker::rank_stream`], plus `Producer` for the first
    /// producer error.
    pub fn try_rank_stream<I, E>(
        &self,
        items: I,
        algorithm: &str,
        top_k: usize,
        batch_size: usize,
        params: &ScoreParams,
    ) -> RankingResult<StreamingResult>
    where
        I: IntoIterator<Item = Result<Item, E>>,
        E: Error + Send + Sync + 'static,
    {
        let mut pass = StreamPass::start(self, algorithm, top_k, batch_size, params)?;
        for next in items {
            let item = next.map_err(|err| RankingError::Producer(Box::new(err)))?;
            pass.push(item)?;
        }
        pass.finish()
    }

    /// Like [`StreamingRanker::rank_stream`] over an async stream.
    ///
    /// # Errors
    /// Same as [`StreamingRanker::rank_stream`].
    pub async fn rank_stream_async<S>(
        &self,
        items: S,
        algorithm: &str,
        top_k: usize,
        batch_size: usize,
        params: &ScoreParams,
    ) -> RankingResult<StreamingResult>
    where
        S: Stream<Item = Item>,
    {
        let mut pass = StreamPass::start(self, algorithm, top_k, batch_size, params)?;
        pin_mut!(items);
        while let Some(item) = items.next().await {
            pass.push(item)?;
        }
        pass.finish()
    }

    /// Like [`StreamingRanker::rank_stream`] over an in-memory slice.
    ///
    /// # Errors
    /// Same as [`StreamingRanker::rank_stream`].
    pub fn rank_slice(
        &self,
        items: &[Item],
        algorithm: &str,
        top_k: usize,
        batch_size: usize,
        params: &ScoreParams,
    ) -> RankingResult<StreamingResult> {
        self.rank_stream(items.iter().cloned(), algorithm, top_k, batch_size, params)
    }
}

/// State of one streaming pass.
struct StreamPass<'a> {
    scorer: &'a dyn Scorer,
    cancel: Option<&'a CancelFlag>,
    params: &'a ScoreParams,
    algorithm: Algorithm,
    now: f64,
    top_k: usize,
    batch_size: usize,
    progress_every_batches: u64,
    heap: BoundedTopK<Item>,
    batch: Vec<Item>,
    scores: Vec<f64>,
    total_processed: u64,
    batches_processed: u64,
    peak_structure_size: usize,
    started: Instant,
}

impl<'a> StreamPass<'a> {
    fn start(
        ranker: &'a StreamingRanker,
        algorithm: &str,
        top_k: usize,
        batch_size: usize,
        params: &'a ScoreParams,
    ) -> RankingResult<Self> {
        let algorithm: Algorithm = algorithm.parse()?;
        if top_k == 0 {
            return Err(RankingError::InvalidArgument(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if batch_size == 0 {
            return Err(RankingError::InvalidArgument(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        params.validate()?;

        debug!(%algorithm, top_k, batch_size, scorer = ranker.scorer.name(), "Starting streaming pass");

        Ok(Self {
            scorer: ranker.scorer.as_ref(),
            cancel: ranker.cancel.as_ref(),
            params,
            algorithm,
            now: ranker.clock.now(),
            top_k,
            batch_size,
            progress_every_batches: ranker.progress_every_batches,
            heap: BoundedTopK::with_capacity(top_k),
            batch: Vec::with_capacity(batch_size.min(MAX_BATCH_PREALLOC)),
            scores: Vec::with_capacity(batch_size.min(MAX_BATCH_PREALLOC)),
            total_processed: 0,
            batches_processed: 0,
            peak_structure_size: 0,
            started: Instant::now(),
        })
    }

    fn push(&mut self, item: Item) -> RankingResult<()> {
        self.batch.push(item);
        if self.batch.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> RankingResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        if self.cancel.is_some_and(CancelFlag::is_cancelled) {
            warn!(
                algorithm = %self.algorithm,
                processed = self.total_processed,
                "Streaming pass cancelled"
            );
            return Err(RankingError::Cancelled {
                processed: self.total_processed,
            });
        }

        self.peak_structure_size = self
            .peak_structure_size
            .max(self.heap.len() + self.batch.len());

        {
            let refs: Vec<&Item> = self.batch.iter().collect();
            self.scorer
                .score_batch(self.algorithm, &refs, self.now, self.params, &mut self.scores)?;
        }

        let batch_len = self.batch.len() as u64;
        for (item, score) in self.batch.drain(..).zip(self.scores.drain(..)) {
            self.heap.offer(score, item);
        }
        self.total_processed += batch_len;
        self.batches_processed += 1;

        debug!(
            batch = self.batches_processed,
            processed = self.total_processed,
            kept = self.heap.len(),
            "Scored batch"
        );
        if self.batches_processed % self.progress_every_batches == 0 {
            info!(
                algorithm = %self.algorithm,
                batches = self.batches_processed,
                processed = self.total_processed,
                min_kept_score = ?self.heap.min_score(),
                "Streaming progress"
            );
        }
        Ok(())
    }

    fn finish(mut self) -> RankingResult<StreamingResult> {
        self.flush()?;

        let entries: Vec<RankedEntry> = self
            .heap
            .into_sorted_desc()
            .into_iter()
            .map(|(score, item)| RankedEntry { score, item })
            .collect();
        let elapsed = self.started.elapsed();

        info!(
            algorithm = %self.algorithm,
            processed = self.total_processed,
            selected = entries.len(),
            peak = self.peak_structure_size,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Streaming pass complete"
        );

        Ok(StreamingResult {
            algorithm: self.algorithm,
            entries,
            total_processed: self.total_processed,
            batches_processed: self.batches_processed,
            top_k: self.top_k,
            batch_size: self.batch_size,
            peak_structure_size: self.peak_structure_size,
            elapsed,
        })
    }
}
