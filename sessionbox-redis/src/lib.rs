//! Redis storage backend for sessionbox.
//!
//! ```no_run
//! use sessionbox_redis::RedisBackend;
//!
//! let backend = RedisBackend::builder()
//!     .host("cache.internal")
//!     .port(6380)
//!     .db(2)
//!     .build()
//!     .unwrap();
//! ```
#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;

#[doc(inline)]
pub use crate::backend::{RedisBackend, RedisBackendBuilder};
#[doc(inline)]
pub use crate::config::RedisConfig;
#[doc(inline)]
pub use crate::error::Error;
