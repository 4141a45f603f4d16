//! CLI parse: clap types for Stratum. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stratum CLI - declarative provisioning for multi-tier hosting
#[derive(Parser)]
#[command(name = "stratum")]
#[command(about = "Declarative provisioning and verification for multi-tier hosting environments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging output
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify one named context (with its providers) or all contexts
    Verify {
        /// Context to verify; omit to verify everything declared
        name: Option<String>,

        /// Plan tasks without executing them
        #[arg(long)]
        dry_run: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show persisted state of every known context
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Inspect declared contexts
    Context {
        #[command(subcommand)]
        command: ContextCommands,
    },
    /// Render the web-server vhost for a verified site
    Emit {
        /// Site context name
        name: String,

        /// Write the artifact to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ContextCommands {
    /// List declared contexts with their capabilities
    List,
    /// Show a context's validated properties
    Show {
        /// Context name
        name: String,
    },
}
