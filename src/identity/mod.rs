//! Identity resolution
//!
//! Maps request metadata to usernames through a pluggable [`UserStore`].
//! Store selection happens once at startup and degrades gracefully: if the
//! configured provider cannot be loaded, the built-in file-backed store
//! takes over so the system stays operable.

pub mod file_store;
pub mod registry;
pub mod store;

pub use file_store::FileStore;
pub use registry::{StoreFactory, StoreRegistry};
pub use store::{RequestMetadata, SharedUserStore, UserStore, AUTHORIZATION, FORWARDED_FOR, REAL_IP};

use crate::config::SecurityConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Select and construct the user store for this process
///
/// An empty provider name selects the built-in store. A named provider is
/// looked up in the registry; on any failure the built-in store is used
/// instead and the failure is logged once. This is the only recovery path
/// for store loading; it is never retried at request time.
pub fn build_store(config: &SecurityConfig, registry: &StoreRegistry) -> SharedUserStore {
    if config.user_store.is_empty() {
        info!("loading default user storage");
        return builtin_store(config);
    }

    match registry.build(&config.user_store, config) {
        Ok(store) => {
            info!(provider = %config.user_store, "loaded user storage");
            store
        }
        Err(err) => {
            warn!(provider = %config.user_store, error = %err,
                "failed to load user storage, defaulting to basic");
            builtin_store(config)
        }
    }
}

/// Open the built-in file store, degrading to an empty store when the
/// users file cannot be read. An empty store resolves nobody, which denies
/// requests rather than letting them through.
fn builtin_store(config: &SecurityConfig) -> SharedUserStore {
    match FileStore::open(&config.users_file) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            warn!(path = %config.users_file, error = %err,
                "failed to read users file, no users will resolve");
            Arc::new(FileStore::empty())
        }
    }
}
