//! Traits and structs for sessionbox storage backend interaction.
//!
//! A backend stores raw, already encoded cache entries under a [`CacheKey`].
//! Encoding, freshness decisions and key derivation belong to the caller; a
//! backend only has to keep bytes around for the requested lifetime.
#![warn(missing_docs)]

mod backend;
mod key;
mod value;

pub use backend::{Backend, BackendResult};
pub use key::CacheKey;
pub use value::{CacheValue, Raw};

use thiserror::Error;

/// Proxy Error describes general groups of errors in backend interaction process.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not bounded with network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    /// Network interaction error.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),
}

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
