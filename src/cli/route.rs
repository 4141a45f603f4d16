//! CLI route: single route table and run context. Dispatches to domain
//! services and presentation.

use crate::cli::parse::{Commands, ContextCommands};
use crate::cli::presentation::{
    format_context_list_text, format_context_show_text, format_report_json, format_report_text,
    format_status_json, format_status_text,
};
use crate::config::{ConfigLoader, StratumConfig};
use crate::context::{Context, ContextKind};
use crate::emit::render_site_vhost;
use crate::error::{ProvisionError, StoreError};
use crate::exec::{
    GitSourceControl, ManifestBuildTool, OfflineProbe, RemoteProbe, SystemProbe, Toolchain,
};
use crate::pipeline::VerificationPipeline;
use crate::registry::CapabilityRegistry;
use crate::store::{ContextRecord, ContextStateStore, SledContextStore};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Runtime context for CLI execution: workspace, loaded configuration,
/// state store, and the capability registry built from declared contexts.
pub struct RunContext {
    config: StratumConfig,
    workspace_root: PathBuf,
    store: SledContextStore,
    registry: Arc<RwLock<CapabilityRegistry>>,
}

impl RunContext {
    /// Create a run context from the workspace root and optional explicit
    /// config path. Configuration problems are reported exhaustively here,
    /// before any command runs.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ProvisionError> {
        let config = if let Some(ref path) = config_path {
            ConfigLoader::load_from_file(path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        config.validate().map_err(|issues| {
            let messages: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
            ProvisionError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;

        let store_path = config.system.storage.resolve_store_path(&workspace_root);
        if let Some(parent) = store_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ProvisionError::StoreError(StoreError::IoError(e)))?;
        }
        let store = SledContextStore::new(&store_path)?;

        let mut registry = CapabilityRegistry::new();
        for context in config.build_contexts()? {
            for capability in context.provided_capabilities() {
                registry.register(&capability, &context.name)?;
            }
        }

        Ok(Self {
            config,
            workspace_root,
            store,
            registry: Arc::new(RwLock::new(registry)),
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ProvisionError> {
        match command {
            Commands::Verify {
                name,
                dry_run,
                format,
            } => self.verify(name.as_deref(), *dry_run, format),
            Commands::Status { format } => self.status(format),
            Commands::Context { command } => match command {
                ContextCommands::List => Ok(format_context_list_text(&self.config)),
                ContextCommands::Show { name } => self.context_show(name),
            },
            Commands::Emit { name, output } => self.emit(name, output.as_deref()),
        }
    }

    fn verify(
        &self,
        target: Option<&str>,
        dry_run: bool,
        format: &str,
    ) -> Result<String, ProvisionError> {
        // One pipeline run holds the registry read lock for its whole
        // duration; no registration can interleave.
        let registry = self.registry.read();

        let mut contexts = self.config.build_contexts()?;
        if let Some(name) = target {
            contexts = select_with_providers(contexts, name, &registry)?;
        }
        info!(targets = contexts.len(), dry_run, "starting verification run");

        let tools = &self.config.tools;
        let toolchain = Toolchain {
            source_control: Box::new(GitSourceControl::new(
                tools.git_program.as_str(),
                tools.timeout(),
            )),
            build_tool: Box::new(ManifestBuildTool::new(
                tools.build_program.as_str(),
                tools.timeout(),
            )),
        };
        let probe: Box<dyn RemoteProbe> = if tools.probe_remotes {
            Box::new(SystemProbe::new(tools.git_program.as_str(), tools.timeout()))
        } else {
            Box::new(OfflineProbe)
        };

        let pipeline =
            VerificationPipeline::new(&registry, &toolchain, probe.as_ref()).dry_run(dry_run);
        let report = pipeline.verify(&mut contexts)?;

        if !dry_run {
            for context in &contexts {
                let record =
                    ContextRecord::from_context(context, report.context(&context.name).cloned());
                self.store.put(&record)?;
            }
            self.store.flush()?;
        }

        let rendered = match format {
            "json" => format_report_json(&report)?,
            _ => format_report_text(&report),
        };

        // A dry run only plans; a successful plan is a successful command.
        if report.dry_run || report.all_verified() {
            Ok(rendered)
        } else {
            Err(ProvisionError::VerificationFailed(rendered))
        }
    }

    fn status(&self, format: &str) -> Result<String, ProvisionError> {
        let records = self.store.list_all()?;
        match format {
            "json" => format_status_json(&records),
            _ => Ok(format_status_text(&records)),
        }
    }

    fn context_show(&self, name: &str) -> Result<String, ProvisionError> {
        let contexts = self.config.build_contexts()?;
        let mut context = contexts
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ProvisionError::UnknownContext(name.to_string()))?;
        // Display-only validation: never probe remotes just to show state.
        let errors = context.configure(&OfflineProbe);
        Ok(format_context_show_text(&context, &errors))
    }

    fn emit(&self, name: &str, output: Option<&Path>) -> Result<String, ProvisionError> {
        let site = self
            .store
            .get(name)?
            .ok_or_else(|| ProvisionError::UnknownContext(name.to_string()))?;
        if site.kind != ContextKind::Site {
            return Err(ProvisionError::ConfigError(format!(
                "'{}' is a {}, not a site",
                name, site.kind
            )));
        }

        let platform = self.provider_record(&site, "platform")?;
        let db_server = self.provider_record(&site, "db")?;
        let vhost = render_site_vhost(&site, &platform, &db_server)?;

        match output {
            Some(path) => {
                std::fs::write(path, &vhost)
                    .map_err(|e| ProvisionError::StoreError(StoreError::IoError(e)))?;
                Ok(format!("Wrote vhost for '{}' to {}", name, path.display()))
            }
            None => Ok(vhost),
        }
    }

    fn provider_record(
        &self,
        dependent: &ContextRecord,
        capability: &str,
    ) -> Result<ContextRecord, ProvisionError> {
        let provider = dependent
            .resolved
            .get(capability)
            .ok_or_else(|| ProvisionError::UnresolvedCapability(capability.to_string()))?;
        self.store
            .get(provider)?
            .ok_or_else(|| ProvisionError::UnknownContext(provider.clone()))
    }
}

/// Reduce a full context set to the target and its transitive providers,
/// preserving declaration order.
fn select_with_providers(
    contexts: Vec<Context>,
    target: &str,
    registry: &CapabilityRegistry,
) -> Result<Vec<Context>, ProvisionError> {
    let mut wanted: BTreeSet<String> = BTreeSet::new();
    {
        let by_name: BTreeMap<&str, &Context> =
            contexts.iter().map(|c| (c.name.as_str(), c)).collect();
        if !by_name.contains_key(target) {
            return Err(ProvisionError::UnknownContext(target.to_string()));
        }

        let mut queue = vec![target.to_string()];
        while let Some(name) = queue.pop() {
            if !wanted.insert(name.clone()) {
                continue;
            }
            if let Some(context) = by_name.get(name.as_str()) {
                for capability in context.required_capabilities() {
                    if let Ok(provider) = registry.resolve(capability) {
                        queue.push(provider.to_string());
                    }
                }
            }
        }
    }
    Ok(contexts
        .into_iter()
        .filter(|c| wanted.contains(&c.name))
        .collect())
}
