//! System implementations of the external collaborators: `git` for source
//! control, a configurable manifest build program, and real remote probes.

use crate::error::ProvisionError;
use crate::exec::{run_with_timeout, BuildTool, RemoteProbe, SourceControl, ToolOutput};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Source control over the system `git` binary.
pub struct GitSourceControl {
    program: String,
    timeout: Duration,
}

impl GitSourceControl {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl SourceControl for GitSourceControl {
    fn probe_remote(&self, url: &str) -> Result<ToolOutput, ProvisionError> {
        run_with_timeout(&self.program, &["ls-remote", url], self.timeout)
    }

    fn clone_into(&self, url: &str, target: &Path) -> Result<ToolOutput, ProvisionError> {
        info!(url, target = %target.display(), "cloning repository");
        let target = target.display().to_string();
        run_with_timeout(&self.program, &["clone", url, target.as_str()], self.timeout)
    }
}

/// Build tool invoked as `<program> make <manifest> <target>`, with
/// `--working-copy` appended when the working-copy mode flag is set.
pub struct ManifestBuildTool {
    program: String,
    timeout: Duration,
}

impl ManifestBuildTool {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl BuildTool for ManifestBuildTool {
    fn build(
        &self,
        manifest: &str,
        target: &Path,
        working_copy: bool,
    ) -> Result<ToolOutput, ProvisionError> {
        info!(manifest, target = %target.display(), working_copy, "building from manifest");
        let target = target.display().to_string();
        let mut args = vec!["make", manifest, target.as_str()];
        if working_copy {
            args.push("--working-copy");
        }
        run_with_timeout(&self.program, &args, self.timeout)
    }
}

/// Real remote probes: `git ls-remote` for repositories, a blocking HTTP
/// GET for manifest URLs.
pub struct SystemProbe {
    git_program: String,
    timeout: Duration,
}

impl SystemProbe {
    pub fn new(git_program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            git_program: git_program.into(),
            timeout,
        }
    }
}

impl RemoteProbe for SystemProbe {
    fn git_remote_reachable(&self, url: &str) -> Result<(), String> {
        let output = run_with_timeout(&self.git_program, &["ls-remote", url], self.timeout)
            .map_err(|e| e.to_string())?;
        if output.success() {
            Ok(())
        } else {
            Err(format!(
                "unable to connect to git remote {} ({})",
                url,
                output.diagnostic()
            ))
        }
    }

    fn manifest_url_readable(&self, url: &str) -> Result<(), String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| e.to_string())?;
        let response = client
            .get(url)
            .send()
            .map_err(|e| format!("the manifest at {} could not be read: {}", url, e))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!(
                "the manifest at {} could not be read (HTTP {})",
                url,
                response.status()
            ))
        }
    }
}
