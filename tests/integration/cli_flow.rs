//! CLI-level flows: parsed arguments through the route table.

use clap::Parser;
use stratum::cli::{Cli, Commands, RunContext};
use tempfile::TempDir;

fn workspace(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".stratum")).unwrap();
    std::fs::write(dir.path().join(".stratum/config.toml"), config).unwrap();
    dir
}

fn stack_config(root: &std::path::Path) -> String {
    format!(
        r#"
[tools]
probe_remotes = false

[contexts.web1]
kind = "server"

[contexts.web1.options]
hostname = "web1.example.test"
services = ["http", "db"]
config_root = "{root}/config"

[contexts.platform1]
kind = "platform"

[contexts.platform1.options]
root = "{root}/p1"

[contexts.site1]
kind = "site"

[contexts.site1.options]
uri = "example.test"
"#,
        root = root.display()
    )
}

#[test]
fn parsed_verify_command_runs_the_pipeline() {
    let dir = TempDir::new().unwrap();
    let platform_root = dir.path().join("p1");
    std::fs::create_dir_all(&platform_root).unwrap();
    std::fs::write(platform_root.join("index.php"), "<?php").unwrap();

    let ws = workspace(&stack_config(dir.path()));
    let ws_arg = ws.path().to_string_lossy();
    let cli = Cli::try_parse_from([
        "stratum",
        "--workspace",
        ws_arg.as_ref(),
        "verify",
        "--format",
        "json",
    ])
    .unwrap();

    let run = RunContext::new(cli.workspace.clone(), cli.config.clone()).unwrap();
    let output = run.execute(&cli.command).unwrap();

    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    let contexts = report["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 3);
    assert!(contexts
        .iter()
        .all(|c| c["state"].as_str() == Some("Verified")));
}

#[test]
fn dry_run_plans_without_touching_the_filesystem_or_store() {
    let dir = TempDir::new().unwrap();
    let ws = workspace(&stack_config(dir.path()));
    let run = RunContext::new(ws.path().to_path_buf(), None).unwrap();

    let output = run
        .execute(&Commands::Verify {
            name: Some("platform1".to_string()),
            dry_run: true,
            format: "text".to_string(),
        })
        .unwrap();
    assert!(output.contains("planned (dry run)"));
    assert!(output.contains("pending"));
    assert!(!dir.path().join("p1").exists());

    // No records were persisted by the dry run.
    let status = run
        .execute(&Commands::Status {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(status.contains("No contexts have been verified yet"));
}

#[test]
fn context_list_and_show_render_declared_state() {
    let dir = TempDir::new().unwrap();
    let ws = workspace(&stack_config(dir.path()));
    let run = RunContext::new(ws.path().to_path_buf(), None).unwrap();

    let list = run
        .execute(&Commands::Context {
            command: stratum::cli::ContextCommands::List,
        })
        .unwrap();
    for name in ["web1", "platform1", "site1"] {
        assert!(list.contains(name), "missing {} in:\n{}", name, list);
    }

    let show = run
        .execute(&Commands::Context {
            command: stratum::cli::ContextCommands::Show {
                name: "site1".to_string(),
            },
        })
        .unwrap();
    assert!(show.contains("example.test"));
    assert!(show.contains("profile"));
}
