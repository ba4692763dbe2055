//! Configuration loading and types

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from_str};
pub use types::{
    AppConfig, LogFormat, LoggingConfig, RoleConfig, RuleConfig, SecurityConfig, ServerConfig,
};
