//! Persistence across verification runs.

use crate::integration::test_utils::{http_server, passing_toolchain, platform_with, registry_for};
use stratum::context::ContextState;
use stratum::exec::OfflineProbe;
use stratum::pipeline::VerificationPipeline;
use stratum::store::{ContextRecord, ContextStateStore, SledContextStore};
use tempfile::TempDir;

#[test]
fn verification_results_survive_a_store_reopen() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("store");
    let platform_root = dir.path().join("p1");
    std::fs::create_dir_all(&platform_root).unwrap();
    std::fs::write(platform_root.join("index.php"), "<?php").unwrap();

    let mut contexts = vec![
        platform_with("platform1", &[("root", platform_root.to_str().unwrap())]),
        http_server("web1", &dir.path().join("cfg")),
    ];
    let registry = registry_for(&contexts);
    let tools = passing_toolchain();
    let pipeline = VerificationPipeline::new(&registry, &tools, &OfflineProbe);
    let report = pipeline.verify(&mut contexts).unwrap();
    assert!(report.all_verified());

    {
        let store = SledContextStore::new(&store_path).unwrap();
        for context in &contexts {
            let record =
                ContextRecord::from_context(context, report.context(&context.name).cloned());
            store.put(&record).unwrap();
        }
        store.flush().unwrap();
    }

    let store = SledContextStore::new(&store_path).unwrap();
    let record = store.get("platform1").unwrap().unwrap();
    assert_eq!(record.state, ContextState::Verified);
    assert_eq!(record.resolved.get("http").map(String::as_str), Some("web1"));
    assert_eq!(
        record.properties.get("root").unwrap().as_text(),
        Some(platform_root.to_str().unwrap())
    );

    let last_report = record.last_report.unwrap();
    assert!(last_report.is_verified());
    assert_eq!(last_report.tasks.last().unwrap().id, "platform.found");
}

#[test]
fn failed_runs_overwrite_the_persisted_state() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("store");
    let platform_root = dir.path().join("p1");
    std::fs::create_dir_all(&platform_root).unwrap();
    std::fs::write(platform_root.join("index.php"), "<?php").unwrap();

    let store = SledContextStore::new(&store_path).unwrap();

    let mut contexts = vec![
        platform_with("platform1", &[("root", platform_root.to_str().unwrap())]),
        http_server("web1", &dir.path().join("cfg")),
    ];
    let registry = registry_for(&contexts);
    let tools = passing_toolchain();
    let pipeline = VerificationPipeline::new(&registry, &tools, &OfflineProbe);
    let report = pipeline.verify(&mut contexts).unwrap();
    for context in &contexts {
        store
            .put(&ContextRecord::from_context(
                context,
                report.context(&context.name).cloned(),
            ))
            .unwrap();
    }
    assert_eq!(
        store.get("platform1").unwrap().unwrap().state,
        ContextState::Verified
    );

    // The platform files disappear; the next run fails and the record
    // reflects it.
    std::fs::remove_dir_all(&platform_root).unwrap();
    let report = pipeline.verify(&mut contexts).unwrap();
    for context in &contexts {
        store
            .put(&ContextRecord::from_context(
                context,
                report.context(&context.name).cloned(),
            ))
            .unwrap();
    }

    let record = store.get("platform1").unwrap().unwrap();
    assert_eq!(record.state, ContextState::Failed);
    let failed = record.last_report.unwrap();
    assert_eq!(failed.failed_task().unwrap().id, "platform.found");
}
