//! hearth-auth
//!
//! Authorization core for a distributed home-automation control plane.
//!
//! ## Components
//!
//! - **Role baking** - author-supplied role definitions are validated and
//!   compiled once at startup; invalid roles and rules are dropped with a
//!   diagnostic, never fatally
//! - **Pluggable identity resolution** - a named user store resolved
//!   through a process-wide registry, falling back to a built-in
//!   file-backed store when the configured provider cannot be loaded
//! - **Permission engine** - merges the grants of every role matching the
//!   resolved caller and answers `(system, resource, verb)` queries
//! - **Trust gate** - HTTP middleware that lets local-network origins
//!   bypass authorization and fails closed for everyone else
//!
//! ## Example Configuration
//!
//! ```toml
//! [security]
//! users_file = "/etc/hearth-auth/users"
//! trusted_networks = ["10.0.0.0/8", "192.168.0.0/16"]
//!
//! [[security.roles]]
//! name = "operators"
//! users = ["op*"]
//!
//! [[security.roles.rules]]
//! system = "device"
//! resources = ["light.*"]
//! verbs = ["get", "command"]
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod identity;
pub mod server;

// Re-export main types
pub use access::{AccessEngine, AuthenticatedUser, System, Verb};
pub use config::{load_config, AppConfig};
pub use error::{AuthError, ConfigError, StoreError};
pub use identity::{RequestMetadata, StoreRegistry, UserStore};
pub use server::{Caller, TrustedNetworks};
