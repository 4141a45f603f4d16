//! Persisted context state: each context's validated property map and last
//! verification report, keyed by context name, so repeated invocations are
//! incremental.

mod persistence;

pub use persistence::SledContextStore;

use crate::context::{Context, ContextKind, ContextState};
use crate::error::StoreError;
use crate::pipeline::ContextReport;
use crate::property::PropertyBag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One context's durable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRecord {
    pub name: String,
    pub kind: ContextKind,
    pub state: ContextState,
    pub properties: PropertyBag,
    /// Capability name -> provider context name, as resolved at the last
    /// verification.
    #[serde(default)]
    pub resolved: BTreeMap<String, String>,
    pub last_report: Option<ContextReport>,
    pub updated_at: DateTime<Utc>,
}

impl ContextRecord {
    pub fn from_context(context: &Context, last_report: Option<ContextReport>) -> Self {
        Self {
            name: context.name.clone(),
            kind: context.kind,
            state: context.state(),
            properties: context.properties().clone(),
            resolved: context.resolved().clone(),
            last_report,
            updated_at: Utc::now(),
        }
    }
}

/// Persistence port for context records.
pub trait ContextStateStore: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<ContextRecord>, StoreError>;
    fn put(&self, record: &ContextRecord) -> Result<(), StoreError>;
    fn remove(&self, name: &str) -> Result<(), StoreError>;
    fn list_all(&self) -> Result<Vec<ContextRecord>, StoreError>;
}
