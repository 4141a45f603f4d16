//! Shared helpers for integration tests: scripted external tools and
//! context builders.

use std::collections::BTreeMap;
use std::path::Path;
use stratum::context::{Context, ContextKind};
use stratum::error::ProvisionError;
use stratum::exec::{BuildTool, SourceControl, ToolOutput, Toolchain};
use stratum::property::PropertyValue;
use stratum::registry::CapabilityRegistry;

/// Scripted source-control/build collaborator. A zero exit simulates the
/// real tool by materializing files at the target.
pub struct ScriptedTool {
    pub exit_code: i32,
    pub stderr: &'static str,
}

impl SourceControl for ScriptedTool {
    fn probe_remote(&self, _url: &str) -> Result<ToolOutput, ProvisionError> {
        Ok(output(0, ""))
    }

    fn clone_into(&self, _url: &str, target: &Path) -> Result<ToolOutput, ProvisionError> {
        if self.exit_code == 0 {
            std::fs::create_dir_all(target).unwrap();
            std::fs::write(target.join("index.php"), "<?php").unwrap();
        }
        Ok(output(self.exit_code, self.stderr))
    }
}

impl BuildTool for ScriptedTool {
    fn build(
        &self,
        _manifest: &str,
        target: &Path,
        _working_copy: bool,
    ) -> Result<ToolOutput, ProvisionError> {
        if self.exit_code == 0 {
            std::fs::create_dir_all(target).unwrap();
            std::fs::write(target.join("index.php"), "<?php").unwrap();
        }
        Ok(output(self.exit_code, self.stderr))
    }
}

fn output(exit_code: i32, stderr: &str) -> ToolOutput {
    ToolOutput {
        exit_code,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

pub fn passing_toolchain() -> Toolchain {
    scripted_toolchain(0, "")
}

pub fn scripted_toolchain(exit_code: i32, stderr: &'static str) -> Toolchain {
    Toolchain {
        source_control: Box::new(ScriptedTool { exit_code, stderr }),
        build_tool: Box::new(ScriptedTool { exit_code, stderr }),
    }
}

pub fn text_options(entries: &[(&str, &str)]) -> BTreeMap<String, PropertyValue> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), PropertyValue::Text(v.to_string())))
        .collect()
}

pub fn http_server(name: &str, config_root: &Path) -> Context {
    let mut options = BTreeMap::new();
    options.insert(
        "services".to_string(),
        PropertyValue::List(vec!["http".to_string(), "db".to_string()]),
    );
    options.insert(
        "config_root".to_string(),
        PropertyValue::Text(config_root.display().to_string()),
    );
    Context::new(name, ContextKind::Server, options)
}

pub fn platform_with(name: &str, options: &[(&str, &str)]) -> Context {
    Context::new(name, ContextKind::Platform, text_options(options))
}

/// Register every capability the given contexts provide.
pub fn registry_for(contexts: &[Context]) -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    for context in contexts {
        for capability in context.provided_capabilities() {
            registry.register(&capability, &context.name).unwrap();
        }
    }
    registry
}
