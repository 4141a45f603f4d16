//! Service capability registry: maps abstract capability names to the
//! context that provides them.
//!
//! One provider per capability per scope. Registration conflicts are an
//! error; the last registration never silently wins.

use crate::error::ProvisionError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    providers: BTreeMap<String, String>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context as the provider of a capability.
    ///
    /// Re-registering the same context for the same capability is a no-op;
    /// a different context is a `DuplicateProvider` error.
    pub fn register(&mut self, capability: &str, context_name: &str) -> Result<(), ProvisionError> {
        if let Some(existing) = self.providers.get(capability) {
            if existing != context_name {
                return Err(ProvisionError::DuplicateProvider {
                    capability: capability.to_string(),
                    existing: existing.clone(),
                    attempted: context_name.to_string(),
                });
            }
            return Ok(());
        }
        self.providers
            .insert(capability.to_string(), context_name.to_string());
        Ok(())
    }

    /// Resolve a capability to its provider context name.
    pub fn resolve(&self, capability: &str) -> Result<&str, ProvisionError> {
        self.providers
            .get(capability)
            .map(String::as_str)
            .ok_or_else(|| ProvisionError::UnresolvedCapability(capability.to_string()))
    }

    /// Remove every capability the named context provides. Dependents are
    /// not touched; they become unresolved on their next lookup.
    pub fn unregister(&mut self, context_name: &str) {
        self.providers.retain(|_, provider| provider != context_name);
    }

    /// Capabilities provided by the named context.
    pub fn capabilities_of(&self, context_name: &str) -> Vec<String> {
        self.providers
            .iter()
            .filter(|(_, provider)| provider.as_str() == context_name)
            .map(|(capability, _)| capability.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.providers.iter()
    }
}
