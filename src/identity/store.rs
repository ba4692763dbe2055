//! User store contract
//!
//! A user store maps request metadata to a username. Implementations are
//! pluggable; the engine treats them as opaque synchronous calls and does
//! no memoization, so every request re-resolves identity.

use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque key/value bag carried from the transport into identity resolution
///
/// Keys are case-insensitive (stored lowercased), values ordered. The HTTP
/// layer fills it from request headers plus the peer address.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    entries: HashMap<String, Vec<String>>,
}

/// Metadata key carrying the forwarded client address hint
pub const FORWARDED_FOR: &str = "x-forwarded-for";
/// Metadata key carrying the direct origin address
pub const REAL_IP: &str = "x-real-ip";
/// Metadata key carrying credentials for the built-in store
pub const AUTHORIZATION: &str = "authorization";

impl RequestMetadata {
    /// Create an empty metadata bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a key
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// First value under a key, if any
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values under a key
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }
}

/// A pluggable identity store
///
/// `resolve` is synchronous and must be internally synchronized if the
/// implementation shares I/O. Failure to find a mapping is
/// `StoreError::IdentityNotFound`; the caller treats it as a denial.
pub trait UserStore: std::fmt::Debug + Send + Sync {
    /// Resolve the caller's username from request metadata
    fn resolve(&self, metadata: &RequestMetadata) -> Result<String, StoreError>;

    /// Short name of the store implementation (for logging)
    fn store_type(&self) -> &'static str;
}

/// Shared handle to a user store
pub type SharedUserStore = Arc<dyn UserStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_keys_are_case_insensitive() {
        let mut meta = RequestMetadata::new();
        meta.insert("X-Forwarded-For", "10.0.0.1");

        assert_eq!(meta.get("x-forwarded-for"), Some("10.0.0.1"));
        assert_eq!(meta.get("X-FORWARDED-FOR"), Some("10.0.0.1"));
        assert!(meta.contains(FORWARDED_FOR));
    }

    #[test]
    fn test_metadata_preserves_value_order() {
        let mut meta = RequestMetadata::new();
        meta.insert("accept", "a");
        meta.insert("accept", "b");

        assert_eq!(meta.get("accept"), Some("a"));
        assert_eq!(meta.get_all("accept"), &["a", "b"]);
    }

    #[test]
    fn test_missing_key() {
        let meta = RequestMetadata::new();
        assert_eq!(meta.get("authorization"), None);
        assert!(meta.get_all("authorization").is_empty());
    }
}
