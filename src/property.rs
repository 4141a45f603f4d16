//! Property schema and validation.
//!
//! Each Context kind declares a static schema: an ordered list of named,
//! typed property descriptors with defaults, required flags, and a
//! validator. Instances carry a validated bag of values bound to that
//! schema. Validation never mutates a previously accepted value: a rejected
//! write leaves the prior value in place.

use crate::error::ProvisionError;
use crate::exec::RemoteProbe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A single configuration value. Paths travel as text and are normalized
/// by validators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Flag(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<PathBuf> {
        self.as_text().map(PathBuf::from)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Flag(b) => write!(f, "{}", b),
            PropertyValue::Integer(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Validation commands available to property schemas.
///
/// A closed set of named validators rather than opaque closures, so a plan
/// (and a config dump) can state what a property is checked against.
/// `ManifestSource` and `GitRemote` consult external collaborators through
/// [`RemoteProbe`]; they may block, but their pass/fail outcome is
/// deterministic for a given input at a given point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validator {
    /// Accept any value unchanged.
    Accept,
    /// Text that is non-empty after trimming.
    NonEmptyText,
    /// A bare host name: non-empty, no whitespace or path separators.
    /// Host-named values become filesystem path components, so anything
    /// that could traverse out of a directory is rejected here.
    HostName,
    /// A filesystem path; relative values are joined to the process working
    /// directory and normalized.
    AbsolutePath,
    /// A build manifest: a readable local file path or a fetchable URL.
    ManifestSource,
    /// A reachable git remote URL.
    GitRemote,
}

impl Validator {
    /// Validate a raw value, returning the (possibly normalized) value to
    /// store.
    pub fn validate(
        &self,
        raw: &PropertyValue,
        probe: &dyn RemoteProbe,
    ) -> Result<PropertyValue, String> {
        match self {
            Validator::Accept => Ok(raw.clone()),
            Validator::NonEmptyText => {
                let text = raw.as_text().ok_or("expected text")?;
                if text.trim().is_empty() {
                    Err("must not be empty".to_string())
                } else {
                    Ok(raw.clone())
                }
            }
            Validator::HostName => {
                let text = raw.as_text().ok_or("expected text")?;
                if text.trim().is_empty() {
                    return Err("must not be empty".to_string());
                }
                if text.chars().any(char::is_whitespace)
                    || text.contains('/')
                    || text.contains('\\')
                    || text.contains("..")
                {
                    return Err(format!(
                        "'{}' is not a valid host name (no whitespace or path separators)",
                        text
                    ));
                }
                Ok(raw.clone())
            }
            Validator::AbsolutePath => {
                let path = raw.as_path().ok_or("expected a path")?;
                let absolute = if path.is_absolute() {
                    path
                } else {
                    std::env::current_dir()
                        .map_err(|e| format!("cannot resolve working directory: {}", e))?
                        .join(path)
                };
                let absolute = dunce::simplified(&absolute).to_path_buf();
                Ok(PropertyValue::Text(absolute.display().to_string()))
            }
            Validator::ManifestSource => {
                let source = raw.as_text().ok_or("expected a path or URL")?;
                if source.trim().is_empty() {
                    return Ok(raw.clone());
                }
                if source.contains("://") {
                    probe.manifest_url_readable(source)?;
                } else if !std::path::Path::new(source).is_file() {
                    return Err(format!("the manifest at {} could not be read", source));
                }
                Ok(raw.clone())
            }
            Validator::GitRemote => {
                let url = raw.as_text().ok_or("expected a URL")?;
                if url.trim().is_empty() {
                    return Ok(raw.clone());
                }
                probe.git_remote_reachable(url)?;
                Ok(raw.clone())
            }
        }
    }
}

/// Static schema entry for one property of a Context kind.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub default: Option<PropertyValue>,
    pub required: bool,
    pub validator: Validator,
}

/// Validated property values for one Context instance.
///
/// Defaults are materialized at configure time, so `get` always answers
/// from stored state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBag {
    values: BTreeMap<String, PropertyValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a value for the descriptor. On rejection the
    /// previously accepted value, if any, is left untouched.
    pub fn set(
        &mut self,
        descriptor: &PropertyDescriptor,
        raw: &PropertyValue,
        probe: &dyn RemoteProbe,
    ) -> Result<(), ProvisionError> {
        match descriptor.validator.validate(raw, probe) {
            Ok(value) => {
                self.values.insert(descriptor.name.to_string(), value);
                Ok(())
            }
            Err(reason) => Err(ProvisionError::PropertyValidation {
                property: descriptor.name.to_string(),
                reason,
            }),
        }
    }

    /// Store a value without running a validator. Used for defaults and for
    /// kind-derived properties computed from already validated input.
    pub fn insert_unchecked(&mut self, name: &str, value: PropertyValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.values.iter()
    }
}
