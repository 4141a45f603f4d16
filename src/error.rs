//! Error types for the provisioning and verification engine.

use thiserror::Error;

/// Persistence-related errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Context record not found: {0}")]
    RecordNotFound(String),

    #[error("Record encoding failed: {0}")]
    Encoding(String),

    #[error("Store I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Engine errors surfaced to callers and the CLI
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Property '{property}' rejected: {reason}")]
    PropertyValidation { property: String, reason: String },

    #[error("Missing required property: {0}")]
    MissingRequiredProperty(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("No provider registered for capability '{0}'")]
    UnresolvedCapability(String),

    #[error(
        "Capability '{capability}' is already provided by '{existing}' \
         (attempted to register '{attempted}')"
    )]
    DuplicateProvider {
        capability: String,
        existing: String,
        attempted: String,
    },

    #[error("Dependency cycle between contexts: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("Capability '{capability}' provider '{provider}' did not verify")]
    ProviderNotVerified {
        capability: String,
        provider: String,
    },

    #[error("Context not found: {0}")]
    UnknownContext(String),

    #[error("Context '{name}' is not verified (state: {state})")]
    NotVerified { name: String, state: String },

    #[error("Task '{task}' failed: {message}")]
    TaskFailure { task: String, message: String },

    #[error("'{operation}' timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Cancelled before '{0}' started")]
    Cancelled(String),

    #[error("Source fetch failed: {0}")]
    SourceFetchFailed(String),

    #[error("Build tool failed: {0}")]
    BuildFailed(String),

    #[error("Failed to run '{program}': {source}")]
    Process {
        program: String,
        source: std::io::Error,
    },

    #[error("Verification failed:\n{0}")]
    VerificationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

impl From<config::ConfigError> for ProvisionError {
    fn from(err: config::ConfigError) -> Self {
        ProvisionError::ConfigError(err.to_string())
    }
}
