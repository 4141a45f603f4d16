//! Context domain: typed hosting-tier nodes and their verification
//! planning.
//!
//! A Context is created from a name, a kind, and a raw option map. It
//! validates its properties against the kind's static schema, resolves its
//! capability requirements against the registry, and plans — but never
//! executes — the ordered tasks that bring its filesystem state to a
//! verified condition.

mod kind;
mod platform;
mod server;
mod site;

pub use kind::ContextKind;

use crate::error::ProvisionError;
use crate::exec::RemoteProbe;
use crate::property::{PropertyBag, PropertyValue};
use crate::registry::CapabilityRegistry;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Lifecycle state of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextState {
    Unconfigured,
    Configured,
    Verifying,
    Verified,
    Failed,
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContextState::Unconfigured => "unconfigured",
            ContextState::Configured => "configured",
            ContextState::Verifying => "verifying",
            ContextState::Verified => "verified",
            ContextState::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// Lookup-only snapshot of a resolved provider context, handed to planners.
/// Never an owning reference: providers own themselves in the pipeline.
#[derive(Debug, Clone)]
pub struct ProviderView {
    pub name: String,
    pub kind: ContextKind,
    pub properties: PropertyBag,
}

/// Resolved providers keyed by capability name.
pub type ProviderMap = BTreeMap<String, ProviderView>;

/// A modeled hosting-infrastructure node.
#[derive(Debug, Clone)]
pub struct Context {
    pub name: String,
    pub kind: ContextKind,
    options: BTreeMap<String, PropertyValue>,
    properties: PropertyBag,
    resolved: BTreeMap<String, String>,
    state: ContextState,
    last_failure: Option<String>,
}

impl Context {
    pub fn new(
        name: impl Into<String>,
        kind: ContextKind,
        options: BTreeMap<String, PropertyValue>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            options,
            properties: PropertyBag::new(),
            resolved: BTreeMap::new(),
            state: ContextState::Unconfigured,
            last_failure: None,
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Validated property value (defaults are materialized at configure
    /// time, so this answers from stored state only).
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn property_text(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_text)
    }

    pub fn property_path(&self, name: &str) -> Option<PathBuf> {
        self.property(name).and_then(PropertyValue::as_path)
    }

    pub fn property_flag(&self, name: &str) -> Option<bool> {
        self.property(name).and_then(PropertyValue::as_flag)
    }

    /// Capability names this context depends on, fixed by its kind.
    pub fn required_capabilities(&self) -> &'static [&'static str] {
        self.kind.required_capabilities()
    }

    /// Capability names this context provides. Servers provide whatever
    /// their `services` property lists; platforms provide `platform`.
    pub fn provided_capabilities(&self) -> Vec<String> {
        match self.kind {
            ContextKind::Server => {
                let declared = self
                    .properties
                    .get("services")
                    .or_else(|| self.options.get("services"));
                match declared {
                    Some(PropertyValue::List(items)) => items.clone(),
                    Some(PropertyValue::Text(one)) => vec![one.clone()],
                    _ => vec!["http".to_string()],
                }
            }
            ContextKind::Platform => vec!["platform".to_string()],
            ContextKind::Site => Vec::new(),
        }
    }

    /// Provider context name for a resolved capability.
    pub fn resolved_provider(&self, capability: &str) -> Option<&str> {
        self.resolved.get(capability).map(String::as_str)
    }

    pub fn resolved(&self) -> &BTreeMap<String, String> {
        &self.resolved
    }

    /// Validate every declared property against the kind's schema.
    ///
    /// Failures are collected exhaustively — unknown options, rejected
    /// values, and missing required properties are all reported in one
    /// pass so an operator can fix the configuration in one edit.
    pub fn configure(&mut self, probe: &dyn RemoteProbe) -> Vec<ProvisionError> {
        let schema = self.kind.schema();
        let mut errors = Vec::new();

        for name in self.options.keys() {
            if !schema.iter().any(|d| d.name == name) {
                errors.push(ProvisionError::UnknownProperty(name.clone()));
            }
        }

        for descriptor in &schema {
            if let Some(raw) = self.options.get(descriptor.name) {
                if let Err(e) = self.properties.set(descriptor, raw, probe) {
                    errors.push(e);
                }
            }
        }

        for descriptor in &schema {
            if !self.properties.contains(descriptor.name) {
                if let Some(default) = &descriptor.default {
                    self.properties
                        .insert_unchecked(descriptor.name, default.clone());
                }
            }
        }

        for descriptor in &schema {
            if descriptor.required && !self.properties.contains(descriptor.name) {
                errors.push(ProvisionError::MissingRequiredProperty(
                    descriptor.name.to_string(),
                ));
            }
        }

        if errors.is_empty() {
            self.kind.finalize(&mut self.properties);
            self.state = ContextState::Configured;
        } else {
            self.mark_failed(join_errors(&errors));
        }
        errors
    }

    /// Resolve every required capability through the registry, collecting
    /// all unresolved requirements before returning.
    pub fn resolve_dependencies(&mut self, registry: &CapabilityRegistry) -> Vec<ProvisionError> {
        let mut errors = Vec::new();
        for capability in self.kind.required_capabilities() {
            match registry.resolve(capability) {
                Ok(provider) => {
                    self.resolved
                        .insert(capability.to_string(), provider.to_string());
                }
                Err(e) => errors.push(e),
            }
        }
        errors
    }

    /// Plan the ordered tasks that bring this context to a provisioned
    /// state. Planning never executes anything.
    pub fn plan(&self, providers: &ProviderMap) -> Result<Vec<Task>, ProvisionError> {
        match self.kind {
            ContextKind::Server => server::plan(self),
            ContextKind::Platform => platform::plan(self),
            ContextKind::Site => site::plan(self, providers),
        }
    }

    /// Lookup-only view of this context for dependents' planners.
    pub fn provider_view(&self) -> ProviderView {
        ProviderView {
            name: self.name.clone(),
            kind: self.kind,
            properties: self.properties.clone(),
        }
    }

    pub fn begin_verifying(&mut self) {
        self.state = ContextState::Verifying;
    }

    pub fn mark_verified(&mut self) {
        self.state = ContextState::Verified;
        self.last_failure = None;
    }

    pub fn mark_failed(&mut self, reason: String) {
        self.state = ContextState::Failed;
        self.last_failure = Some(reason);
    }
}

fn join_errors(errors: &[ProvisionError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
