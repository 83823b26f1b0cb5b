//! Error types for Redis backend operations.
//!
//! All errors convert into [`BackendError`] so the cache layer can handle
//! every backend uniformly. I/O level failures (refused or dropped
//! connections, timeouts) become [`BackendError::ConnectionError`], anything
//! else [`BackendError::InternalError`].
//!
//! [`BackendError`]: sessionbox_backend::BackendError
//! [`BackendError::ConnectionError`]: sessionbox_backend::BackendError::ConnectionError
//! [`BackendError::InternalError`]: sessionbox_backend::BackendError::InternalError

use redis::RedisError;
use sessionbox_backend::BackendError;

/// Error type for Redis backend operations.
///
/// Appears when [`RedisBackendBuilder::build`] gets an invalid connection
/// URL, or when a cache operation fails. The connection is established
/// lazily, so an unreachable server is only reported by the first operation.
///
/// [`RedisBackendBuilder::build`]: crate::RedisBackendBuilder::build
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    #[error("Redis backend error: {0}")]
    Redis(#[from] RedisError),
}

impl Error {
    fn is_connection_error(&self) -> bool {
        match self {
            Error::Redis(error) => {
                error.is_io_error()
                    || error.is_connection_refusal()
                    || error.is_connection_dropped()
                    || error.is_timeout()
            }
        }
    }
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        if error.is_connection_error() {
            Self::ConnectionError(Box::new(error))
        } else {
            Self::InternalError(Box::new(error))
        }
    }
}
