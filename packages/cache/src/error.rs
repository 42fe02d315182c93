//! Error types for the cache layer.

/// Errors raised by caches.
///
/// Factory failures supplied at the call site keep the caller's own error
/// type; only the installed missing-value provider reports through
/// `Provider`.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The key is absent and no missing-value provider is installed.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// `add_value` or `fill` was used without a key selector.
    #[error("no key selector installed")]
    NoKeySelector,

    /// The installed missing-value provider failed.
    #[error("missing value provider failed: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CacheError {
    /// Wrap an arbitrary error raised by a missing-value provider.
    pub fn provider(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        CacheError::Provider(e.into())
    }

    pub(crate) fn key_not_found(key: &impl std::fmt::Debug) -> Self {
        CacheError::KeyNotFound {
            key: format!("{:?}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn key_not_found_display() {
        let e = CacheError::key_not_found(&"users");
        assert_eq!(e.to_string(), "key not found: \"users\"");
    }

    #[test]
    fn provider_error_has_source() {
        let e = CacheError::provider("boom");
        assert!(e.to_string().contains("boom"));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn no_key_selector_source_is_none() {
        assert!(StdError::source(&CacheError::NoKeySelector).is_none());
    }
}
