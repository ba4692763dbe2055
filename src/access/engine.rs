//! Permission engine
//!
//! Owns the baked roles and the user store; this is the enforcement query
//! surface every privileged action goes through. Baked state is immutable
//! for the process lifetime and safe for unsynchronized concurrent reads.

use crate::access::baker;
use crate::access::types::{AuthenticatedUser, BakedRole, BakedRule, System, Verb};
use crate::config::SecurityConfig;
use crate::error::AuthError;
use crate::identity::{self, RequestMetadata, SharedUserStore, StoreRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Role-based access control engine
pub struct AccessEngine {
    roles: Vec<BakedRole>,
    store: SharedUserStore,
}

impl AccessEngine {
    /// Bake the configured roles and select the user store
    ///
    /// Runs once at startup. Baking degrades by dropping invalid roles and
    /// rules; store selection degrades to the built-in store. Neither path
    /// fails construction.
    pub fn new(config: &SecurityConfig, registry: &StoreRegistry) -> Self {
        let roles = baker::bake(&config.roles);
        info!(
            configured = config.roles.len(),
            baked = roles.len(),
            "baked security roles"
        );

        let store = identity::build_store(config, registry);
        Self { roles, store }
    }

    /// Build an engine from already-baked parts (useful for testing)
    pub fn with_parts(roles: Vec<BakedRole>, store: SharedUserStore) -> Self {
        Self { roles, store }
    }

    /// Resolve the caller and merge the grants of every matching role
    ///
    /// Roles are independent and additive: grants union, never intersect.
    /// A username matching zero roles yields a valid identity with an
    /// empty grant mapping; only a failed resolution is an error.
    pub fn get_user(&self, metadata: &RequestMetadata) -> Result<AuthenticatedUser, AuthError> {
        let username = self.store.resolve(metadata)?;

        let mut rules: HashMap<System, Vec<Arc<BakedRule>>> = HashMap::new();
        for role in &self.roles {
            if !role.matches_user(&username) {
                continue;
            }
            debug!(user = %username, role = %role.name, "role matched user");
            for rule in &role.rules {
                rules.entry(rule.system).or_default().push(Arc::clone(rule));
            }
        }

        Ok(AuthenticatedUser { username, rules })
    }

    /// Whether `identity` may apply `verb` to `resource` within `system`
    ///
    /// Pure and side-effect-free; the single enforcement point.
    pub fn is_allowed(
        &self,
        identity: &AuthenticatedUser,
        system: System,
        resource: &str,
        verb: Verb,
    ) -> bool {
        identity.is_allowed(system, resource, verb)
    }

    /// Number of roles that survived baking
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}
