//! Built-in file-backed user store
//!
//! The fallback store the system always carries: a plain `user:secret`
//! lines file read once at construction, resolved against the request's
//! basic-auth metadata. It exists so identity resolution keeps working when
//! no custom provider is configured or the configured one fails to load.

use crate::error::StoreError;
use crate::identity::store::{RequestMetadata, UserStore, AUTHORIZATION};
use base64::prelude::{Engine, BASE64_STANDARD};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// File-backed user store
#[derive(Debug)]
pub struct FileStore {
    users: HashMap<String, String>,
}

impl FileStore {
    /// Load users from a `user:secret` lines file
    ///
    /// Blank lines and lines starting with `#` are ignored. Malformed
    /// lines (no `:`) are skipped with a diagnostic.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&contents))
    }

    /// Build a store from file contents (useful for testing)
    pub fn parse(contents: &str) -> Self {
        let mut users = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(':') {
                Some((user, secret)) if !user.is_empty() => {
                    users.insert(user.to_string(), secret.to_string());
                }
                _ => tracing::warn!(line = %line, "skipping malformed users file line"),
            }
        }
        Self { users }
    }

    /// Build an empty store
    pub fn empty() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Number of known users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store knows no users
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Pull username/secret out of a `Basic` authorization value
fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ").or_else(|| value.strip_prefix("basic "))?;
    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, secret) = decoded.split_once(':')?;
    Some((user.to_string(), secret.to_string()))
}

impl UserStore for FileStore {
    fn resolve(&self, metadata: &RequestMetadata) -> Result<String, StoreError> {
        let header = metadata
            .get(AUTHORIZATION)
            .ok_or(StoreError::IdentityNotFound)?;

        let (username, secret) =
            decode_basic(header).ok_or(StoreError::IdentityNotFound)?;

        match self.users.get(&username) {
            Some(expected) if *expected == secret => Ok(username),
            _ => Err(StoreError::IdentityNotFound),
        }
    }

    fn store_type(&self) -> &'static str {
        "basic"
    }
}
