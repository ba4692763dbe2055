//! User store registry
//!
//! A process-wide capability lookup mapping a provider name to a factory.
//! Populated once at startup; replaces dynamic plugin loading with a
//! portable indirection point.

use crate::config::SecurityConfig;
use crate::error::StoreError;
use crate::identity::store::SharedUserStore;
use std::collections::HashMap;
use tracing::debug;

/// Factory building a user store from the security configuration
pub type StoreFactory =
    Box<dyn Fn(&SecurityConfig) -> Result<SharedUserStore, StoreError> + Send + Sync>;

/// Registry of named user-store factories
#[derive(Default)]
pub struct StoreRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl StoreRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a provider name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&SecurityConfig) -> Result<SharedUserStore, StoreError>
            + Send
            + Sync
            + 'static,
    ) {
        let name = name.into();
        debug!(provider = %name, "registered user store factory");
        self.factories.insert(name, Box::new(factory));
    }

    /// Build the store registered under `name`
    ///
    /// Fails with `UnknownProvider` when the name is not registered, or
    /// with whatever the factory itself returns.
    pub fn build(
        &self,
        name: &str,
        config: &SecurityConfig,
    ) -> Result<SharedUserStore, StoreError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| StoreError::UnknownProvider {
                name: name.to_string(),
            })?;
        factory(config)
    }

    /// Registered provider names
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no factory is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::file_store::FileStore;
    use std::sync::Arc;

    #[test]
    fn test_empty_registry() {
        let registry = StoreRegistry::new();
        assert!(registry.is_empty());

        let err = registry
            .build("ldap", &SecurityConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownProvider { .. }));
    }

    #[test]
    fn test_register_and_build() {
        let mut registry = StoreRegistry::new();
        registry.register("memory", |_| Ok(Arc::new(FileStore::parse("alice:x"))));

        assert_eq!(registry.len(), 1);
        let store = registry.build("memory", &SecurityConfig::default()).unwrap();
        assert_eq!(store.store_type(), "basic");
    }

    #[test]
    fn test_factory_failure_propagates() {
        let mut registry = StoreRegistry::new();
        registry.register("flaky", |_| Err(StoreError::Load("boom".into())));

        let err = registry
            .build("flaky", &SecurityConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::Load(_)));
    }
}
