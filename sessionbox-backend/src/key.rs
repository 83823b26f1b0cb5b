//! Cache key representation.
//!
//! Keys follow the format `{prefix}:v{version}:{subject}`:
//!
//! - prefix is omitted if empty
//! - version is omitted if zero
//!
//! ```
//! use sessionbox_backend::CacheKey;
//!
//! let key = CacheKey::new("api", 1, "GET https://example.com/");
//! assert_eq!(key.as_str(), "api:v1:GET https://example.com/");
//!
//! let key = CacheKey::new("", 0, "GET https://example.com/");
//! assert_eq!(key.as_str(), "GET https://example.com/");
//! ```

use std::fmt;

use smol_str::{SmolStr, format_smolstr};

/// Key under which a cache entry is stored.
///
/// Cloning is cheap, long keys are reference counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    inner: SmolStr,
}

impl CacheKey {
    /// Builds a key from a namespace prefix, a version and a subject.
    pub fn new(prefix: &str, version: u32, subject: &str) -> Self {
        let inner = match (prefix.is_empty(), version) {
            (true, 0) => SmolStr::new(subject),
            (true, version) => format_smolstr!("v{version}:{subject}"),
            (false, 0) => format_smolstr!("{prefix}:{subject}"),
            (false, version) => format_smolstr!("{prefix}:v{version}:{subject}"),
        };
        Self { inner }
    }

    /// Returns the serialized key.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
