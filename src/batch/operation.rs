use async_trait::async_trait;
use std::future::Future;

/// Per-item work applied by the executor.
///
/// Any closure `Fn(T) -> impl Future<Output = Result<R, E>>` returning an
/// owned (`'static`) future is an operation already. Implement the trait by hand when the work needs state,
/// such as a client or a connection pool.
///
/// # Examples
/// ```
/// use async_trait::async_trait;
/// use batchrun::batch::Operation;
///
/// struct Square;
///
/// #[async_trait]
/// impl Operation<u64> for Square {
///     type Output = u64;
///     type Error = String;
///
///     async fn call(&self, item: u64) -> Result<u64, String> {
///         item.checked_mul(item).ok_or_else(|| "overflow".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Operation<T>: Send + Sync
where
    T: Send + 'static,
{
    type Output: Send;
    type Error: Send;

    async fn call(&self, item: T) -> Result<Self::Output, Self::Error>;
}

#[async_trait]
impl<T, F, Fut, R, E> Operation<T> for F
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    type Output = R;
    type Error = E;

    async fn call(&self, item: T) -> Result<R, E> {
        (self)(item).await
    }
}
