//! Verification reports: the aggregate result of one pipeline run.

use crate::context::{ContextKind, ContextState};
use crate::task::{Task, TaskOutcome, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one task within a context's run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub id: String,
    pub description: String,
    pub status: TaskStatus,
    pub message: String,
    pub exit_code: Option<i32>,
}

impl TaskReport {
    /// A planned task that has not run (dry run, or skipped after an
    /// earlier failure).
    pub fn pending(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            description: task.description.clone(),
            status: TaskStatus::Pending,
            message: String::new(),
            exit_code: None,
        }
    }

    pub fn from_outcome(task: &Task, outcome: TaskOutcome) -> Self {
        Self {
            id: task.id.clone(),
            description: task.description.clone(),
            status: outcome.status,
            message: outcome.message,
            exit_code: outcome.exit_code,
        }
    }
}

/// Terminal result for one context, with every collected error and task
/// outcome. Self-contained: an operator can see why a context failed
/// without consulting logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextReport {
    pub name: String,
    pub kind: ContextKind,
    pub state: ContextState,
    pub errors: Vec<String>,
    pub tasks: Vec<TaskReport>,
}

impl ContextReport {
    pub fn is_verified(&self) -> bool {
        self.state == ContextState::Verified
    }

    /// The task the failure is attributed to, if any.
    pub fn failed_task(&self) -> Option<&TaskReport> {
        self.tasks
            .iter()
            .find(|t| matches!(t.status, TaskStatus::Failure | TaskStatus::Cancelled))
    }
}

/// Aggregate report for one pipeline run, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// True when the run only planned tasks without executing them.
    #[serde(default)]
    pub dry_run: bool,
    pub contexts: Vec<ContextReport>,
}

impl VerificationReport {
    pub fn all_verified(&self) -> bool {
        self.contexts.iter().all(ContextReport::is_verified)
    }

    pub fn context(&self, name: &str) -> Option<&ContextReport> {
        self.contexts.iter().find(|c| c.name == name)
    }
}
