//! Error types for session requests.

use thiserror::Error;

/// Boxed error source used by the timeout and connection variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`Session::request`](crate::Session::request).
///
/// Timeout and connection failures are counted in the request metrics before
/// they are returned. Nothing is ever swallowed or replaced by a default.
#[derive(Debug, Error)]
pub enum Error {
    /// The request exceeded the configured or per-call timeout.
    ///
    /// This includes failing to connect within the connect timeout.
    #[error("request to {host} timed out")]
    Timeout {
        /// Destination `host[:port]`.
        host: String,
        /// Underlying transport error.
        #[source]
        source: BoxError,
    },

    /// A connection to the destination could not be established
    /// (DNS failure, refused connection, TLS handshake failure, ...).
    #[error("failed to connect to {host}")]
    Connection {
        /// Destination `host[:port]`.
        host: String,
        /// Underlying transport error.
        #[source]
        source: BoxError,
    },

    /// The request was rejected before any network activity.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other failure reported by the HTTP client, passed through as is.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// Classifies a client error for the given destination.
    ///
    /// Timeouts win over connection failures, so a connect timeout is a
    /// [`Error::Timeout`].
    pub(crate) fn from_transport(host: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Error::Timeout {
                host: host.to_owned(),
                source: Box::new(error),
            }
        } else if error.is_connect() {
            Error::Connection {
                host: host.to_owned(),
                source: Box::new(error),
            }
        } else {
            Error::Transport(error)
        }
    }

    pub(crate) fn invalid(reason: impl std::fmt::Display) -> Self {
        Error::InvalidRequest(reason.to_string())
    }

    /// Returns `true` for [`Error::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns `true` for [`Error::Connection`].
    pub fn is_connect(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns `true` for [`Error::InvalidRequest`].
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }

    /// Destination host of a timeout or connection failure.
    pub fn host(&self) -> Option<&str> {
        match self {
            Error::Timeout { host, .. } | Error::Connection { host, .. } => Some(host),
            _ => None,
        }
    }
}
