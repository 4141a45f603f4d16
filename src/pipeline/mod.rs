//! Verification pipeline: orders contexts by capability dependency and
//! drives each one through configure → resolve → plan → execute.
//!
//! Task failures are fail-fast within a context and isolated across
//! contexts; only a dependency cycle aborts the whole run. The registry is
//! borrowed immutably for the duration of a run, so no capability can be
//! re-registered mid-verification.

mod order;
mod report;

pub use order::topological_order;
pub use report::{ContextReport, TaskReport, VerificationReport};

use crate::context::{Context, ContextState, ProviderMap};
use crate::error::ProvisionError;
use crate::exec::{CancelToken, RemoteProbe, Toolchain};
use crate::registry::CapabilityRegistry;
use crate::task::TaskOutcome;
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{info, warn};

pub struct VerificationPipeline<'a> {
    registry: &'a CapabilityRegistry,
    toolchain: &'a Toolchain,
    probe: &'a dyn RemoteProbe,
    cancel: CancelToken,
    dry_run: bool,
}

impl<'a> VerificationPipeline<'a> {
    pub fn new(
        registry: &'a CapabilityRegistry,
        toolchain: &'a Toolchain,
        probe: &'a dyn RemoteProbe,
    ) -> Self {
        Self {
            registry,
            toolchain,
            probe,
            cancel: CancelToken::new(),
            dry_run: false,
        }
    }

    /// Plan without executing: tasks are reported Pending and no context
    /// advances past Configured.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Verify the supplied contexts in dependency order.
    ///
    /// Fails only on a dependency cycle (no safe order exists); every other
    /// failure is captured in the report against the context it belongs to.
    pub fn verify(&self, contexts: &mut [Context]) -> Result<VerificationReport, ProvisionError> {
        let started_at = Utc::now();

        let index_of: BTreeMap<String, usize> = contexts
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();

        let deps_of: Vec<Vec<usize>> = contexts
            .iter()
            .map(|context| {
                context
                    .required_capabilities()
                    .iter()
                    .filter_map(|capability| {
                        self.registry
                            .resolve(capability)
                            .ok()
                            .and_then(|provider| index_of.get(provider))
                            .copied()
                    })
                    .collect()
            })
            .collect();

        let execution_order = topological_order(contexts.len(), |i| deps_of[i].clone())
            .map_err(|cycle| {
                ProvisionError::DependencyCycle(
                    cycle.iter().map(|&i| contexts[i].name.clone()).collect(),
                )
            })?;

        let mut outcome_of: BTreeMap<String, ContextState> = BTreeMap::new();
        let mut reports = Vec::with_capacity(contexts.len());

        for &i in &execution_order {
            let report = self.verify_one(contexts, i, &index_of, &outcome_of);
            outcome_of.insert(report.name.clone(), report.state);
            reports.push(report);
        }

        Ok(VerificationReport {
            started_at,
            finished_at: Utc::now(),
            dry_run: self.dry_run,
            contexts: reports,
        })
    }

    fn verify_one(
        &self,
        contexts: &mut [Context],
        i: usize,
        index_of: &BTreeMap<String, usize>,
        outcome_of: &BTreeMap<String, ContextState>,
    ) -> ContextReport {
        let (name, kind) = (contexts[i].name.clone(), contexts[i].kind);
        info!(context = %name, %kind, "verifying context");

        let mut errors = {
            let context = &mut contexts[i];
            let mut errors = Vec::new();
            if !matches!(
                context.state(),
                ContextState::Configured | ContextState::Verified
            ) {
                errors.extend(context.configure(self.probe));
            }
            errors.extend(context.resolve_dependencies(self.registry));
            errors
        };

        // A context never starts until every provider it depends on has
        // reached a terminal state; a failed provider fails the dependent
        // without running its tasks.
        for (capability, provider) in contexts[i].resolved() {
            if outcome_of.get(provider) == Some(&ContextState::Failed) {
                errors.push(ProvisionError::ProviderNotVerified {
                    capability: capability.clone(),
                    provider: provider.clone(),
                });
            }
        }

        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            warn!(context = %name, errors = messages.len(), "context failed before planning");
            contexts[i].mark_failed(messages.join("; "));
            return ContextReport {
                name,
                kind,
                state: ContextState::Failed,
                errors: messages,
                tasks: Vec::new(),
            };
        }

        let providers: ProviderMap = contexts[i]
            .resolved()
            .iter()
            .filter_map(|(capability, provider)| {
                index_of
                    .get(provider)
                    .map(|&j| (capability.clone(), contexts[j].provider_view()))
            })
            .collect();

        let planned = match contexts[i].plan(&providers) {
            Ok(tasks) => tasks,
            Err(e) => {
                let message = e.to_string();
                contexts[i].mark_failed(message.clone());
                return ContextReport {
                    name,
                    kind,
                    state: ContextState::Failed,
                    errors: vec![message],
                    tasks: Vec::new(),
                };
            }
        };

        if self.dry_run {
            return ContextReport {
                name,
                kind,
                state: contexts[i].state(),
                errors: Vec::new(),
                tasks: planned.iter().map(TaskReport::pending).collect(),
            };
        }

        contexts[i].begin_verifying();
        let mut task_reports = Vec::with_capacity(planned.len());
        let mut failure: Option<String> = None;

        for task in &planned {
            if failure.is_some() {
                // Later tasks assume earlier ones succeeded; report the
                // rest of the plan unexecuted.
                task_reports.push(TaskReport::pending(task));
                continue;
            }
            if self.cancel.is_cancelled() {
                failure = Some(ProvisionError::Cancelled(task.id.clone()).to_string());
                task_reports.push(TaskReport::from_outcome(task, TaskOutcome::cancelled()));
                continue;
            }
            let outcome = task.execute(self.toolchain);
            let failed = !outcome.is_success();
            if failed {
                failure = Some(
                    ProvisionError::TaskFailure {
                        task: task.id.clone(),
                        message: outcome.message.clone(),
                    }
                    .to_string(),
                );
            }
            task_reports.push(TaskReport::from_outcome(task, outcome));
        }

        let errors = match failure {
            Some(message) => {
                contexts[i].mark_failed(message.clone());
                vec![message]
            }
            None => {
                contexts[i].mark_verified();
                Vec::new()
            }
        };

        let state = contexts[i].state();
        info!(context = %name, %state, "context verification finished");
        ContextReport {
            name,
            kind,
            state,
            errors,
            tasks: task_reports,
        }
    }
}
