//! Integration tests for the configuration system.

use stratum::config::ConfigLoader;
use stratum::context::ContextKind;
use stratum::exec::OfflineProbe;
use stratum::property::PropertyValue;
use tempfile::TempDir;

#[test]
fn config_builds_configured_contexts() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");

    std::fs::write(
        &config_file,
        r#"
[tools]
git_program = "git"
build_program = "composer"
probe_remotes = false

[contexts.web1]
kind = "server"

[contexts.web1.options]
hostname = "web1.example.test"
services = ["http"]

[contexts.db1]
kind = "server"

[contexts.db1.options]
hostname = "db1.example.test"
services = ["db"]
port = 3306

[contexts.site1]
kind = "site"

[contexts.site1.options]
uri = "example.test"
language = "fi"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());

    let mut contexts = config.build_contexts().unwrap();
    assert_eq!(contexts.len(), 3);

    for context in &mut contexts {
        let errors = context.configure(&OfflineProbe);
        assert!(errors.is_empty(), "{}: {:?}", context.name, errors);
    }

    let db1 = contexts.iter().find(|c| c.name == "db1").unwrap();
    assert_eq!(db1.kind, ContextKind::Server);
    assert_eq!(
        db1.property("port"),
        Some(&PropertyValue::Integer(3306))
    );
    assert_eq!(db1.provided_capabilities(), vec!["db".to_string()]);

    let site1 = contexts.iter().find(|c| c.name == "site1").unwrap();
    assert_eq!(site1.property_text("language"), Some("fi"));
    assert_eq!(site1.property_text("profile"), Some("standard"));
}

#[test]
fn workspace_file_is_picked_up_by_layered_loading() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join(".stratum")).unwrap();
    std::fs::write(
        temp_dir.path().join(".stratum/config.toml"),
        r#"
[tools]
timeout_secs = 42

[contexts.web1]
kind = "server"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.tools.timeout_secs, 42);
    assert!(config.contexts.contains_key("web1"));
}

#[test]
fn missing_workspace_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert!(config.contexts.is_empty());
    assert_eq!(config.tools.git_program, "git");
}

#[test]
fn malformed_config_is_a_readable_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(&config_file, "contexts = 3").unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}
