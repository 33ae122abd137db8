//! Shared Runtime

use crate::batch::{self, BatchResult, Operation};
use once_cell::sync::Lazy;
use tokio::runtime::{Builder, Runtime};

/// Global multi-thread runtime reused across the crate.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build global runtime")
});

/// Run a future to completion on the shared runtime.
///
/// Panics if called from inside an async context.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    RUNTIME.block_on(future)
}

/// Blocking form of [`batch::execute`] for synchronous callers.
pub fn execute_blocking<T, O>(
    concurrency: usize,
    items: impl IntoIterator<Item = T>,
    operation: O,
    settled: bool,
) -> BatchResult<O::Output, O::Error>
where
    T: Send + 'static,
    O: Operation<T>,
{
    block_on(batch::execute(concurrency, items, operation, settled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_blocking_runs_on_shared_runtime() {
        let report = execute_blocking(
            2,
            vec![1, 2, 3],
            |n: i32| async move {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                Ok::<_, String>(n + 1)
            },
            false,
        )
        .unwrap();

        assert_eq!(report.chunk_count, 2);
        assert_eq!(report.into_values(), Some(vec![2, 3, 4]));
    }

    #[test]
    fn execute_blocking_surfaces_invalid_arguments() {
        let err = execute_blocking(0, vec![1], |n: i32| async move { Ok::<_, String>(n) }, true)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
