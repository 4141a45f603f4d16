//! End-to-end pipeline scenarios over mock external tools.

use crate::integration::test_utils::{
    http_server, passing_toolchain, platform_with, registry_for, scripted_toolchain,
};
use stratum::context::ContextState;
use stratum::exec::OfflineProbe;
use stratum::pipeline::VerificationPipeline;
use stratum::task::TaskStatus;
use tempfile::TempDir;

#[test]
fn platform_with_git_url_and_absent_root_clones_then_verifies() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("p1");

    let mut contexts = vec![
        platform_with(
            "platform1",
            &[
                ("root", root.to_str().unwrap()),
                ("git_url", "https://example/repo.git"),
            ],
        ),
        http_server("web1", &dir.path().join("cfg")),
    ];
    let registry = registry_for(&contexts);
    let tools = passing_toolchain();

    let pipeline = VerificationPipeline::new(&registry, &tools, &OfflineProbe);
    let report = pipeline.verify(&mut contexts).unwrap();

    let platform = report.context("platform1").unwrap();
    assert_eq!(platform.state, ContextState::Verified);
    let ids: Vec<&str> = platform.tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["platform.git", "platform.found"]);
    assert!(platform.tasks.iter().all(|t| t.status == TaskStatus::Success));
    assert!(root.join("index.php").exists());
}

#[test]
fn clone_failure_skips_existence_check_and_attributes_the_failure() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("p1");

    let mut contexts = vec![
        platform_with(
            "platform1",
            &[
                ("root", root.to_str().unwrap()),
                ("git_url", "https://example/repo.git"),
            ],
        ),
        http_server("web1", &dir.path().join("cfg")),
    ];
    let registry = registry_for(&contexts);
    let tools = scripted_toolchain(128, "fatal: repository not found");

    let pipeline = VerificationPipeline::new(&registry, &tools, &OfflineProbe);
    let report = pipeline.verify(&mut contexts).unwrap();

    let platform = report.context("platform1").unwrap();
    assert_eq!(platform.state, ContextState::Failed);

    let clone = &platform.tasks[0];
    assert_eq!(clone.id, "platform.git");
    assert_eq!(clone.status, TaskStatus::Failure);
    assert_eq!(clone.exit_code, Some(128));
    assert!(clone.message.contains("repository not found"));

    let existence = &platform.tasks[1];
    assert_eq!(existence.id, "platform.found");
    assert_eq!(existence.status, TaskStatus::Pending);

    assert_eq!(platform.failed_task().unwrap().id, "platform.git");
    assert!(platform.errors[0].contains("platform.git"));
}

#[test]
fn reverification_of_existing_root_plans_only_the_existence_check() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("p1");

    let mut contexts = vec![
        platform_with(
            "platform1",
            &[
                ("root", root.to_str().unwrap()),
                ("git_url", "https://example/repo.git"),
            ],
        ),
        http_server("web1", &dir.path().join("cfg")),
    ];
    let registry = registry_for(&contexts);
    let tools = passing_toolchain();

    let pipeline = VerificationPipeline::new(&registry, &tools, &OfflineProbe);
    let first = pipeline.verify(&mut contexts).unwrap();
    assert!(first.all_verified());

    // Second pass: the clone already happened, so the plan collapses to
    // the cheap existence check and succeeds again.
    let second = pipeline.verify(&mut contexts).unwrap();
    let platform = second.context("platform1").unwrap();
    assert_eq!(platform.state, ContextState::Verified);
    assert_eq!(platform.tasks.len(), 1);
    assert_eq!(platform.tasks[0].id, "platform.found");
    assert_eq!(platform.tasks[0].status, TaskStatus::Success);
}

#[test]
fn execution_order_is_stable_across_input_orders() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.php"), "<?php").unwrap();

    for reversed in [false, true] {
        let mut contexts = vec![
            platform_with("platform1", &[("root", dir.path().to_str().unwrap())]),
            http_server("web1", &dir.path().join("cfg")),
        ];
        if reversed {
            contexts.reverse();
        }
        let registry = registry_for(&contexts);
        let tools = passing_toolchain();
        let pipeline = VerificationPipeline::new(&registry, &tools, &OfflineProbe);
        let report = pipeline.verify(&mut contexts).unwrap();

        let names: Vec<&str> = report.contexts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["web1", "platform1"], "reversed={}", reversed);
    }
}

#[test]
fn platform_without_source_and_absent_root_fails_the_existence_check() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("p1");

    let mut contexts = vec![
        platform_with("platform1", &[("root", root.to_str().unwrap())]),
        http_server("web1", &dir.path().join("cfg")),
    ];
    let registry = registry_for(&contexts);
    let tools = passing_toolchain();

    let pipeline = VerificationPipeline::new(&registry, &tools, &OfflineProbe);
    let report = pipeline.verify(&mut contexts).unwrap();

    let platform = report.context("platform1").unwrap();
    assert_eq!(platform.state, ContextState::Failed);
    assert_eq!(platform.tasks.len(), 1);
    assert_eq!(platform.tasks[0].id, "platform.found");
    assert_eq!(platform.tasks[0].status, TaskStatus::Failure);
}
