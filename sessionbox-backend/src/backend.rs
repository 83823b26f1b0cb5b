use std::sync::Arc;

use async_trait::async_trait;

use crate::{BackendError, CacheKey, CacheValue, DeleteStatus, Raw};

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Storage for encoded cache entries.
///
/// Implementations must be safe to share between concurrent requests; any
/// connection pooling is the implementation's own business.
#[async_trait]
pub trait Backend: Sync + Send {
    /// Reads the entry stored under `key`, `None` if there is none.
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>>;

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Stores that support native expiration should honor [`CacheValue::ttl`].
    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()>;

    /// Removes the entry stored under `key`.
    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus>;

    /// Name of this backend, used in log events.
    fn label(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}
