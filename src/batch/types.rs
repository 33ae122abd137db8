use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default number of in-flight operations per chunk.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// How a chunk is joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// The first failure aborts the whole run.
    #[default]
    AllOrFail,

    /// Every operation runs to completion; failures become [`Outcome::Failure`].
    Settled,
}

impl JoinMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AllOrFail => "all-or-fail",
            Self::Settled => "settled",
        }
    }
}

impl From<bool> for JoinMode {
    fn from(settled: bool) -> Self {
        if settled {
            Self::Settled
        } else {
            Self::AllOrFail
        }
    }
}

/// Executor options.
///
/// ```
/// use batchrun::batch::{BatchOptions, JoinMode};
///
/// let opts = BatchOptions::new().with_concurrency(50).settled();
/// assert_eq!(opts.concurrency, 50);
/// assert_eq!(opts.mode, JoinMode::Settled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub mode: JoinMode,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            mode: JoinMode::default(),
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_mode(mut self, mode: JoinMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn settled(self) -> Self {
        self.with_mode(JoinMode::Settled)
    }

    /// Load options from a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

/// Result for a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome<R, E> {
    Success(R),
    Failure(E),
}

impl<R, E> Outcome<R, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn success(&self) -> Option<&R> {
        match self {
            Self::Success(v) => Some(v),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<R, E> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Failure(e) => Err(e),
        }
    }
}

impl<R, E> From<Result<R, E>> for Outcome<R, E> {
    fn from(result: Result<R, E>) -> Self {
        match result {
            Ok(v) => Self::Success(v),
            Err(e) => Self::Failure(e),
        }
    }
}

/// Timing for one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkStats {
    /// Position of the chunk in the run, starting at 0
    pub index: usize,
    /// Input index of the chunk's first item
    pub offset: usize,
    /// Number of items in the chunk
    pub size: usize,
    /// Time from dispatch until the whole chunk resolved
    pub elapsed: Duration,
    /// Failed items (always 0 in all-or-fail mode)
    pub failures: usize,
}

/// Everything a completed run produced.
///
/// `results[i]` is the outcome for input item `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport<R, E> {
    pub results: Vec<Outcome<R, E>>,
    pub total_elapsed: Duration,
    pub chunk_count: usize,
    pub average_chunk_time: Duration,
    pub chunks: Vec<ChunkStats>,
}

impl<R, E> RunReport<R, E> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|o| o.is_failure()).count()
    }

    /// True when no item failed.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(Outcome::is_success)
    }

    /// Success values in input order, or `None` if any item failed.
    pub fn into_values(self) -> Option<Vec<R>> {
        self.results
            .into_iter()
            .map(|o| o.into_result().ok())
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            items: self.len(),
            chunk_count: self.chunk_count,
            succeeded: self.succeeded(),
            failed: self.failed(),
            total_elapsed_ms: self.total_elapsed.as_millis() as u64,
            average_chunk_ms: self.average_chunk_time.as_secs_f64() * 1_000.0,
        }
    }
}

/// Flat, millisecond-based view of a [`RunReport`] for printing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub items: usize,
    pub chunk_count: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_elapsed_ms: u64,
    pub average_chunk_ms: f64,
}
