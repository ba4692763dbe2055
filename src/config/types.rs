//! Configuration types for hearth-auth
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Security settings: roles, user store, trusted networks
    pub security: SecurityConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8180,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Named user-store provider; empty selects the built-in file store
    pub user_store: String,

    /// Users file for the built-in store (`user:secret` lines)
    pub users_file: String,

    /// CIDR allowlist of networks trusted to bypass authorization.
    /// Defaults to the standard private ranges plus loopback.
    pub trusted_networks: Vec<String>,

    /// Author-supplied role definitions
    pub roles: Vec<RoleConfig>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            user_store: String::new(),
            users_file: "users".to_string(),
            trusted_networks: Vec::new(),
            roles: Vec::new(),
        }
    }
}

/// Authoring-time shape of a role
///
/// Structural validation (non-empty lists) is the loader's concern;
/// pattern-level validation happens during baking, where bad entries are
/// dropped with a diagnostic instead of failing startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleConfig {
    /// Role name (diagnostics only; duplicates are permitted and additive)
    #[serde(default)]
    pub name: String,

    /// Glob patterns selecting the users this role applies to
    #[serde(default)]
    pub users: Vec<String>,

    /// Access rules granted by this role
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Authoring-time shape of a single access rule
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleConfig {
    /// System tag: `*` or `device`
    pub system: String,

    /// Glob patterns selecting resources
    #[serde(default)]
    pub resources: Vec<String>,

    /// Verb tags: `*`, `get`, `command`, `history`
    #[serde(default)]
    pub verbs: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
