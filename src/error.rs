//! Error types for hearth-auth
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors that are part of the API;
//! the HTTP layer maps them to status codes at the boundary.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create an invalid-pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// User store errors
///
/// Returned by `UserStore` implementations and by the store registry.
/// Load failures are absorbed at startup by falling back to the built-in
/// store; `IdentityNotFound` crosses into the request path and always
/// resolves to a denial.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no user matches the request metadata")]
    IdentityNotFound,

    #[error("user store '{name}' is not registered")]
    UnknownProvider { name: String },

    #[error("failed to load user store: {0}")]
    Load(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authorization errors surfaced by the permission engine
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("identity not found")]
    IdentityNotFound,

    #[error("user store failed: {0}")]
    Store(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::IdentityNotFound => AuthError::IdentityNotFound,
            other => AuthError::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_identity_not_found() {
        let err: AuthError = StoreError::IdentityNotFound.into();
        assert!(matches!(err, AuthError::IdentityNotFound));
    }

    #[test]
    fn test_other_store_errors_map_to_store_variant() {
        let err: AuthError = StoreError::Load("bad plugin".into()).into();
        assert!(matches!(err, AuthError::Store(_)));

        let err: AuthError = StoreError::UnknownProvider {
            name: "ldap".into(),
        }
        .into();
        assert!(matches!(err, AuthError::Store(_)));
    }

    #[test]
    fn test_invalid_pattern_constructor() {
        let err = ConfigError::invalid_pattern("[!", "unterminated character class");
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
        assert!(err.to_string().contains("unterminated"));
    }
}
