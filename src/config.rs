//! Configuration System
//!
//! Layered configuration for declared contexts and tool settings:
//! defaults, then the global user file, then the workspace file, then
//! `STRATUM_*` environment overrides. Validation is exhaustive — every
//! problem is reported in one pass.

use crate::context::{Context, ContextKind};
use crate::error::ProvisionError;
use crate::logging::LoggingConfig;
use crate::property::PropertyValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StratumConfig {
    /// Declared contexts, keyed by context name
    #[serde(default)]
    pub contexts: BTreeMap<String, ContextDecl>,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// System-wide settings
    #[serde(default)]
    pub system: SystemConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One declared context: its kind plus the raw option map handed to
/// property validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDecl {
    pub kind: String,

    #[serde(default)]
    pub options: BTreeMap<String, PropertyValue>,
}

/// External tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Source-control program
    #[serde(default = "default_git_program")]
    pub git_program: String,

    /// Manifest build program
    #[serde(default = "default_build_program")]
    pub build_program: String,

    /// Bounded wait applied to every external tool invocation, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Probe git remotes and manifest URLs during property validation
    #[serde(default = "default_true")]
    pub probe_remotes: bool,
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_build_program() -> String {
    "drush".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git_program: default_git_program(),
            build_program: default_build_program(),
            timeout_secs: default_timeout_secs(),
            probe_remotes: default_true(),
        }
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// System-wide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Context state database path; relative paths resolve against the
    /// workspace root.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".stratum/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl StorageConfig {
    pub fn resolve_store_path(&self, workspace_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            workspace_root.join(&self.store_path)
        }
    }
}

/// Configuration validation problems
#[derive(Debug, Clone)]
pub enum ConfigIssue {
    Context(String, String),
    Tools(String),
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::Context(name, msg) => write!(f, "Context '{}': {}", name, msg),
            ConfigIssue::Tools(msg) => write!(f, "Tools: {}", msg),
        }
    }
}

impl std::error::Error for ConfigIssue {}

impl StratumConfig {
    /// Validate the entire configuration, collecting every issue.
    pub fn validate(&self) -> Result<(), Vec<ConfigIssue>> {
        let mut issues = Vec::new();

        for (name, decl) in &self.contexts {
            if name.trim().is_empty() {
                issues.push(ConfigIssue::Context(
                    name.clone(),
                    "context name cannot be empty".to_string(),
                ));
            }
            if let Err(e) = decl.kind.parse::<ContextKind>() {
                issues.push(ConfigIssue::Context(name.clone(), e));
            }
        }

        // One provider per capability per scope; report clashes at
        // configuration time rather than at registration.
        let mut provider_of: BTreeMap<String, &str> = BTreeMap::new();
        for (name, decl) in &self.contexts {
            for capability in declared_capabilities(decl) {
                if let Some(existing) = provider_of.insert(capability.clone(), name) {
                    issues.push(ConfigIssue::Context(
                        name.clone(),
                        format!(
                            "capability '{}' is already provided by '{}'",
                            capability, existing
                        ),
                    ));
                }
            }
        }

        if self.tools.timeout_secs == 0 {
            issues.push(ConfigIssue::Tools(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.tools.git_program.trim().is_empty() {
            issues.push(ConfigIssue::Tools(
                "git_program cannot be empty".to_string(),
            ));
        }
        if self.tools.build_program.trim().is_empty() {
            issues.push(ConfigIssue::Tools(
                "build_program cannot be empty".to_string(),
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Build unconfigured context instances from the declarations, in
    /// declaration (name) order.
    pub fn build_contexts(&self) -> Result<Vec<Context>, ProvisionError> {
        let mut contexts = Vec::with_capacity(self.contexts.len());
        for (name, decl) in &self.contexts {
            let kind: ContextKind = decl
                .kind
                .parse()
                .map_err(ProvisionError::ConfigError)?;
            contexts.push(Context::new(name.clone(), kind, decl.options.clone()));
        }
        Ok(contexts)
    }
}

/// Capabilities a declaration will provide once instantiated, computed
/// from raw options (validation has not run yet).
fn declared_capabilities(decl: &ContextDecl) -> Vec<String> {
    match decl.kind.as_str() {
        "server" => match decl.options.get("services") {
            Some(PropertyValue::List(items)) => items.clone(),
            Some(PropertyValue::Text(one)) => vec![one.clone()],
            _ => vec!["http".to_string()],
        },
        "platform" => vec!["platform".to_string()],
        _ => Vec::new(),
    }
}

/// Loads configuration from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Path to the per-user global config file.
    pub fn global_config_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("stratum").join("config.toml"))
    }

    /// Load layered configuration for a workspace: global file, then
    /// `.stratum/config.toml` in the workspace, then STRATUM_* environment
    /// overrides.
    pub fn load(workspace_root: &Path) -> Result<StratumConfig, ProvisionError> {
        let mut builder = config::Config::builder();

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                debug!(path = %global.display(), "loading global config");
                builder = builder.add_source(config::File::from(global).required(false));
            }
        }

        let workspace_file = workspace_root.join(".stratum").join("config.toml");
        if workspace_file.exists() {
            debug!(path = %workspace_file.display(), "loading workspace config");
            builder = builder.add_source(config::File::from(workspace_file));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("STRATUM")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load a single explicit config file, bypassing layering.
    pub fn load_from_file(path: &Path) -> Result<StratumConfig, ProvisionError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ProvisionError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}
