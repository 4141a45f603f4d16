//! External tool collaborators: source control, build tool, and the remote
//! probes used by property validators.
//!
//! The engine never shells out directly; every external effect goes through
//! one of the trait seams here so the pipeline can be driven against mock
//! tools in tests and in dry-run planning.

mod process;
mod system;

pub use process::run_with_timeout;
pub use system::{GitSourceControl, ManifestBuildTool, SystemProbe};

use crate::error::ProvisionError;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

/// Captured output of one external tool invocation. Raw output is retained
/// for diagnostics on failure.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// The most useful diagnostic line for a failed invocation.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit code {}", self.exit_code)
        } else {
            format!("exit code {}: {}", self.exit_code, stderr)
        }
    }
}

/// Source-control collaborator (git).
pub trait SourceControl: Send + Sync {
    /// Check that a remote URL is reachable.
    fn probe_remote(&self, url: &str) -> Result<ToolOutput, ProvisionError>;

    /// Clone a repository into the target path.
    fn clone_into(&self, url: &str, target: &Path) -> Result<ToolOutput, ProvisionError>;
}

/// Build-tool collaborator: builds a tree from a manifest.
pub trait BuildTool: Send + Sync {
    fn build(
        &self,
        manifest: &str,
        target: &Path,
        working_copy: bool,
    ) -> Result<ToolOutput, ProvisionError>;
}

/// Validator-time reachability checks for remote resources.
pub trait RemoteProbe: Send + Sync {
    fn git_remote_reachable(&self, url: &str) -> Result<(), String>;
    fn manifest_url_readable(&self, url: &str) -> Result<(), String>;
}

/// Probe that treats every remote as reachable. Used when remote probing is
/// disabled in the tools configuration and for read-only property display.
pub struct OfflineProbe;

impl RemoteProbe for OfflineProbe {
    fn git_remote_reachable(&self, _url: &str) -> Result<(), String> {
        Ok(())
    }

    fn manifest_url_readable(&self, _url: &str) -> Result<(), String> {
        Ok(())
    }
}

/// The pair of external tools a pipeline run executes tasks with.
pub struct Toolchain {
    pub source_control: Box<dyn SourceControl>,
    pub build_tool: Box<dyn BuildTool>,
}

/// Caller-supplied cancellation signal, checked at safe checkpoints only
/// (before a task starts, never mid-clone).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// True when the path exists and holds at least one entry. Clone and build
/// tasks use this to decide whether the target state is already present.
pub fn contains_files(path: &Path) -> bool {
    path.exists()
        && WalkDir::new(path)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .next()
            .is_some()
}
