use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A shared resource the controller opens before listening and releases after the
/// listener stopped, e.g. a database pool. The controller calls `close` at most once
/// per successful `open`.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Cheap handle shared with request handlers (typically an `Arc` or a pool).
    type Resource: Clone + Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short label used in logs and errors.
    fn name(&self) -> &'static str;

    /// Open the resource. Implementations should give up early once `shutdown`
    /// is cancelled.
    async fn open(&self, shutdown: &CancellationToken) -> Result<Self::Resource, Self::Error>;

    /// Best-effort release; must not fail.
    async fn close(&self, resource: Self::Resource);
}
