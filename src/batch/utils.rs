use crate::error::BatchError;
use std::time::Duration;

/// Number of chunks needed to cover `len` items. `concurrency` must already be
/// validated as non-zero.
pub(crate) fn chunk_count(len: usize, concurrency: usize) -> usize {
    len.div_ceil(concurrency)
}

pub(crate) fn validate_concurrency<E>(concurrency: usize) -> Result<usize, BatchError<E>> {
    if concurrency == 0 {
        return Err(BatchError::invalid(
            "concurrency_limit",
            "must be a positive integer, got 0",
        ));
    }
    Ok(concurrency)
}

pub(crate) fn validate_items<T, E>(items: &[T]) -> Result<(), BatchError<E>> {
    if items.is_empty() {
        return Err(BatchError::invalid("items", "must be a non-empty sequence"));
    }
    Ok(())
}

/// Plain mean of summed chunk time; zero chunks yields zero.
pub(crate) fn average_duration(total: Duration, count: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() / count as u128;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
