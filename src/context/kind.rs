//! Context kinds: the closed set of hosting-tier node types.

use crate::context::{platform, server, site};
use crate::property::{PropertyBag, PropertyDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The hosting tier a context models. New tiers are added as new variants
/// implementing the same schema/planning surface, not by subclassing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Server,
    Platform,
    Site,
}

impl ContextKind {
    /// Static property schema for this kind.
    pub fn schema(&self) -> Vec<PropertyDescriptor> {
        match self {
            ContextKind::Server => server::schema(),
            ContextKind::Platform => platform::schema(),
            ContextKind::Site => site::schema(),
        }
    }

    /// Capabilities contexts of this kind depend on.
    pub fn required_capabilities(&self) -> &'static [&'static str] {
        match self {
            ContextKind::Server => &[],
            ContextKind::Platform => &["http"],
            ContextKind::Site => &["platform", "db"],
        }
    }

    /// Kind-specific derived properties, computed after validation.
    pub(crate) fn finalize(&self, properties: &mut PropertyBag) {
        if let ContextKind::Platform = self {
            platform::finalize(properties);
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContextKind::Server => "server",
            ContextKind::Platform => "platform",
            ContextKind::Site => "site",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for ContextKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" => Ok(ContextKind::Server),
            "platform" => Ok(ContextKind::Platform),
            "site" => Ok(ContextKind::Site),
            other => Err(format!(
                "unknown context kind '{}' (expected server, platform, or site)",
                other
            )),
        }
    }
}
