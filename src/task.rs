//! Task domain: named, inspectable remediation actions with structured
//! outcomes.
//!
//! A Task is planned by a Context and executed by the pipeline. Actions are
//! a closed command set so a plan can be rendered (dry run) before anything
//! runs. Every action is idempotent: it checks whether its target condition
//! already holds and skips the side-effecting step if so.

use crate::error::ProvisionError;
use crate::exec::{contains_files, Toolchain};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// What a task does when executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskAction {
    /// Clone a repository into the target path, skipped when the target
    /// already contains files.
    CloneRepository { url: String, target: PathBuf },
    /// Build the target path from a manifest, skipped when the target
    /// already contains files.
    BuildFromManifest {
        manifest: String,
        target: PathBuf,
        working_copy: bool,
    },
    /// Create a directory (and parents) if absent.
    EnsureDirectory { path: PathBuf },
    /// Authoritative existence check: succeeds iff the path exists,
    /// reporting whether the state was pre-existing.
    PathPresent { path: PathBuf },
}

/// Execution state of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Success,
    Failure,
    Cancelled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Success => "success",
            TaskStatus::Failure => "failure",
            TaskStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

/// Result of executing (or skipping) one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub status: TaskStatus,
    pub message: String,
    pub exit_code: Option<i32>,
}

impl TaskOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Success,
            message: message.into(),
            exit_code: None,
        }
    }

    pub fn failure(message: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            status: TaskStatus::Failure,
            message: message.into(),
            exit_code,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: TaskStatus::Cancelled,
            message: "cancelled before start".to_string(),
            exit_code: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

/// A named unit of remediation work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique within the owning context's task list, e.g. `platform.git`.
    pub id: String,
    pub description: String,
    pub action: TaskAction,
}

impl Task {
    pub fn new(id: impl Into<String>, description: impl Into<String>, action: TaskAction) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            action,
        }
    }

    /// Execute the action. Collaborator faults are converted into a
    /// structured failure outcome here; nothing propagates past the task
    /// boundary.
    pub fn execute(&self, tools: &Toolchain) -> TaskOutcome {
        info!(task = %self.id, "{}", self.description);
        let outcome = self.run_action(tools);
        match outcome.status {
            TaskStatus::Success => info!(task = %self.id, "{}", outcome.message),
            _ => warn!(task = %self.id, "{}", outcome.message),
        }
        outcome
    }

    fn run_action(&self, tools: &Toolchain) -> TaskOutcome {
        match &self.action {
            TaskAction::CloneRepository { url, target } => {
                if contains_files(target) {
                    return TaskOutcome::success(format!(
                        "Files already exist at {}; clone skipped",
                        target.display()
                    ));
                }
                match tools.source_control.clone_into(url, target) {
                    Ok(output) if output.success() => {
                        TaskOutcome::success(format!("Cloned {} into {}", url, target.display()))
                    }
                    Ok(output) => TaskOutcome::failure(
                        ProvisionError::SourceFetchFailed(format!(
                            "git clone {}: {}",
                            url,
                            output.diagnostic()
                        ))
                        .to_string(),
                        Some(output.exit_code),
                    ),
                    Err(e) => TaskOutcome::failure(e.to_string(), None),
                }
            }
            TaskAction::BuildFromManifest {
                manifest,
                target,
                working_copy,
            } => {
                if contains_files(target) {
                    return TaskOutcome::success(format!(
                        "Files already exist at {}; build skipped",
                        target.display()
                    ));
                }
                match tools.build_tool.build(manifest, target, *working_copy) {
                    Ok(output) if output.success() => TaskOutcome::success(format!(
                        "Built {} from {}",
                        target.display(),
                        manifest
                    )),
                    Ok(output) => TaskOutcome::failure(
                        ProvisionError::BuildFailed(format!(
                            "{}: {}",
                            manifest,
                            output.diagnostic()
                        ))
                        .to_string(),
                        Some(output.exit_code),
                    ),
                    Err(e) => TaskOutcome::failure(e.to_string(), None),
                }
            }
            TaskAction::EnsureDirectory { path } => {
                if path.is_dir() {
                    return TaskOutcome::success(format!(
                        "Directory already present: {}",
                        path.display()
                    ));
                }
                match std::fs::create_dir_all(path) {
                    Ok(()) => TaskOutcome::success(format!("Created {}", path.display())),
                    Err(e) => TaskOutcome::failure(
                        format!("Could not create {}: {}", path.display(), e),
                        None,
                    ),
                }
            }
            TaskAction::PathPresent { path } => {
                if path.exists() {
                    TaskOutcome::success(format!("Path present: {}", path.display()))
                } else {
                    TaskOutcome::failure(format!("Path missing: {}", path.display()), None)
                }
            }
        }
    }
}
