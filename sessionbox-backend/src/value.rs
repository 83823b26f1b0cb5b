//! Cached value with expiration metadata.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Raw encoded cache entry as it is kept by backends.
pub type Raw = Bytes;

/// A cached value with an optional expiration timestamp.
///
/// The expiration is the retention deadline of the stored entry. Whether the
/// entry is still fresh enough to be served is decided by the caller from the
/// entry contents.
///
/// ```
/// use sessionbox_backend::CacheValue;
/// use chrono::Utc;
///
/// let value = CacheValue::new("payload", Some(Utc::now() + chrono::Duration::hours(1)));
/// assert_eq!(value.data(), &"payload");
/// assert!(value.ttl().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValue<T> {
    data: T,
    expire: Option<DateTime<Utc>>,
}

impl<T> CacheValue<T> {
    /// Creates a new cache value.
    pub fn new(data: T, expire: Option<DateTime<Utc>>) -> Self {
        CacheValue { data, expire }
    }

    /// Creates a value that expires after `ttl`.
    pub fn with_ttl(data: T, ttl: Duration) -> Self {
        let expire = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        CacheValue { data, expire }
    }

    /// Returns a reference to the cached data.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the entry expires.
    #[inline]
    pub fn expire(&self) -> Option<DateTime<Utc>> {
        self.expire
    }

    /// Consumes the value, returning the data.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Returns `true` if the expiration timestamp is in the past.
    pub fn is_expired(&self) -> bool {
        self.expire.is_some_and(|expire| expire <= Utc::now())
    }

    /// Remaining lifetime in whole milliseconds.
    ///
    /// Returns `None` when the value never expires or is already expired.
    pub fn ttl(&self) -> Option<Duration> {
        self.expire.and_then(|expire| {
            let duration = expire.signed_duration_since(Utc::now());
            if duration.num_milliseconds() > 0 {
                Some(Duration::from_millis(duration.num_milliseconds() as u64))
            } else {
                None
            }
        })
    }
}
