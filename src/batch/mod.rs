//! Batch Tools
//!
//! Runs an async [`Operation`] over a list of items in consecutive chunks of at
//! most `concurrency` items. Every item of a chunk is in flight at once; the next
//! chunk starts only after the whole previous chunk resolved. Results always
//! come back in input order.

mod operation;
mod types;
mod utils;

pub use operation::Operation;
pub use types::*;

use crate::clock::{Clock, SystemClock};
use crate::error::BatchError;
use futures_util::future::join_all;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub type BatchResult<R, E> = Result<RunReport<R, E>, BatchError<E>>;

/// Run `operation` over `items`, at most `concurrency` at a time.
///
/// With `settled == false` the first failing item aborts the run and its error
/// is returned as [`BatchError::Operation`]. With `settled == true` every item
/// runs and failures are reported per item as [`Outcome::Failure`].
///
/// # Examples
/// ```
/// use batchrun::batch::{execute, Outcome};
///
/// # async fn example() {
/// let report = execute(
///     3,
///     vec![1, 2, 3, 4, 5],
///     |n: u32| async move { Ok::<_, String>(n * 2) },
///     false,
/// )
/// .await
/// .unwrap();
///
/// assert_eq!(report.chunk_count, 2);
/// assert_eq!(report.results[0], Outcome::Success(2));
/// # }
/// ```
pub async fn execute<T, O>(
    concurrency: usize,
    items: impl IntoIterator<Item = T>,
    operation: O,
    settled: bool,
) -> BatchResult<O::Output, O::Error>
where
    T: Send + 'static,
    O: Operation<T>,
{
    let options = BatchOptions::new()
        .with_concurrency(concurrency)
        .with_mode(JoinMode::from(settled));
    BatchExecutor::new(options).run(items, operation).await
}

/// Configurable executor; holds options and the clock used for timing.
#[derive(Clone)]
pub struct BatchExecutor {
    options: BatchOptions,
    clock: Arc<dyn Clock>,
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new(BatchOptions::default())
    }
}

impl BatchExecutor {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Run `operation` over `items` with this executor's options.
    ///
    /// Arguments are validated before any operation is invoked. In all-or-fail
    /// mode a failure lets the rest of its chunk finish, then returns the first
    /// error without a report and without starting another chunk.
    #[instrument(
        skip_all,
        fields(concurrency = self.options.concurrency, mode = self.options.mode.name())
    )]
    pub async fn run<T, O>(
        &self,
        items: impl IntoIterator<Item = T>,
        operation: O,
    ) -> BatchResult<O::Output, O::Error>
    where
        T: Send + 'static,
        O: Operation<T>,
    {
        let concurrency = utils::validate_concurrency::<O::Error>(self.options.concurrency)?;
        let items: Vec<T> = items.into_iter().collect();
        utils::validate_items::<T, O::Error>(&items)?;

        let total_items = items.len();
        let expected_chunks = utils::chunk_count(total_items, concurrency);
        info!(items = total_items, chunks = expected_chunks, "batch run started");

        let start = self.clock.now();
        let mut results = Vec::with_capacity(total_items);
        let mut chunks = Vec::with_capacity(expected_chunks);
        let mut chunk_time = Duration::ZERO;
        let mut offset = 0;
        let mut remaining = items.into_iter();

        while offset < total_items {
            let chunk: Vec<T> = remaining.by_ref().take(concurrency).collect();
            let index = chunks.len();
            let size = chunk.len();

            let chunk_start = self.clock.now();
            let outcomes = match self.options.mode {
                JoinMode::AllOrFail => match join_all_or_fail(&operation, chunk).await {
                    Ok(outcomes) => outcomes,
                    Err(e) => {
                        warn!(chunk = index, offset, size, "operation failed, aborting run");
                        return Err(BatchError::Operation(e));
                    }
                },
                JoinMode::Settled => join_settled(&operation, chunk).await,
            };
            let elapsed = self.clock.now().saturating_duration_since(chunk_start);
            chunk_time += elapsed;

            let failures = outcomes.iter().filter(|o| o.is_failure()).count();
            debug!(
                chunk = index,
                offset,
                size,
                failures,
                elapsed_ms = elapsed.as_millis() as u64,
                "chunk resolved"
            );

            chunks.push(ChunkStats {
                index,
                offset,
                size,
                elapsed,
                failures,
            });
            results.extend(outcomes);
            offset += concurrency;
        }

        let total_elapsed = self.clock.now().saturating_duration_since(start);
        let chunk_count = chunks.len();
        let average_chunk_time = utils::average_duration(chunk_time, chunk_count);

        info!(
            chunks = chunk_count,
            elapsed_ms = total_elapsed.as_millis() as u64,
            "batch run finished"
        );

        Ok(RunReport {
            results,
            total_elapsed,
            chunk_count,
            average_chunk_time,
            chunks,
        })
    }
}

/// Join a chunk, failing with the first error by completion order.
///
/// Every operation of the chunk runs to completion; only the error that
/// resolved first is kept.
async fn join_all_or_fail<T, O>(
    operation: &O,
    chunk: Vec<T>,
) -> Result<Vec<Outcome<O::Output, O::Error>>, O::Error>
where
    T: Send + 'static,
    O: Operation<T>,
{
    let mut pending: FuturesUnordered<_> = chunk
        .into_iter()
        .enumerate()
        .map(|(i, item)| async move { (i, operation.call(item).await) })
        .collect();

    let mut values: Vec<Option<O::Output>> = std::iter::repeat_with(|| None)
        .take(pending.len())
        .collect();
    let mut first_error = None;
    while let Some((i, result)) = pending.next().await {
        match result {
            Ok(value) => values[i] = Some(value),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(values
            .into_iter()
            .flatten()
            .map(Outcome::Success)
            .collect()),
    }
}

/// Join a chunk, keeping every item's outcome.
async fn join_settled<T, O>(operation: &O, chunk: Vec<T>) -> Vec<Outcome<O::Output, O::Error>>
where
    T: Send + 'static,
    O: Operation<T>,
{
    join_all(chunk.into_iter().map(|item| operation.call(item)))
        .await
        .into_iter()
        .map(Outcome::from)
        .collect()
}
