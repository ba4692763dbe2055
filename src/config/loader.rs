//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (HEARTH_AUTH_*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "hearth-auth.toml",
    ".hearth-auth.toml",
    "~/.config/hearth-auth/config.toml",
    "/etc/hearth-auth/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // Defaults come from the serde defaults on AppConfig.
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // Environment variables with HEARTH_AUTH_ prefix; double underscore
    // maps to nested keys (HEARTH_AUTH_SERVER__PORT -> server.port).
    builder = builder.add_source(
        Environment::with_prefix("HEARTH_AUTH")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
///
/// Structural checks only. Role patterns are deliberately not validated
/// here: the baker owns pattern-level validation and degrades by dropping
/// the offending rule or role rather than failing startup.
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    if config.security.user_store.is_empty() && config.security.users_file.is_empty() {
        return Err(ConfigError::Missing {
            field: "security.users_file".to_string(),
        });
    }

    for role in &config.security.roles {
        if role.name.is_empty() {
            return Err(ConfigError::Invalid {
                message: "security.roles entries must have a name".to_string(),
            });
        }
    }

    for network in &config.security.trusted_networks {
        if network.is_empty() {
            return Err(ConfigError::Invalid {
                message: "security.trusted_networks entries must not be empty".to_string(),
            });
        }
    }

    Ok(())
}
