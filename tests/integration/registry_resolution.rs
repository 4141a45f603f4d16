//! Registry semantics across context lifecycles.

use crate::integration::test_utils::http_server;
use stratum::error::ProvisionError;
use stratum::registry::CapabilityRegistry;

#[test]
fn zero_providers_always_fails_resolution() {
    let registry = CapabilityRegistry::new();
    for capability in ["http", "db", "platform"] {
        assert!(matches!(
            registry.resolve(capability),
            Err(ProvisionError::UnresolvedCapability(_))
        ));
    }
}

#[test]
fn second_provider_for_a_capability_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut registry = CapabilityRegistry::new();
    let web1 = http_server("web1", &dir.path().join("cfg1"));
    let web2 = http_server("web2", &dir.path().join("cfg2"));

    for capability in web1.provided_capabilities() {
        registry.register(&capability, &web1.name).unwrap();
    }
    let mut clashes = 0;
    for capability in web2.provided_capabilities() {
        if matches!(
            registry.register(&capability, &web2.name),
            Err(ProvisionError::DuplicateProvider { .. })
        ) {
            clashes += 1;
        }
    }
    assert_eq!(clashes, 2); // http and db both already provided by web1
}

#[test]
fn unregister_leaves_dependents_unresolved_without_cascading() {
    let mut registry = CapabilityRegistry::new();
    registry.register("http", "web1").unwrap();
    registry.register("platform", "p1").unwrap();

    registry.unregister("web1");

    // The platform provider is untouched; only the dependency dangles.
    assert!(registry.resolve("http").is_err());
    assert_eq!(registry.resolve("platform").unwrap(), "p1");

    // A dependent resolving afterwards collects the unresolved capability.
    let mut platform = crate::integration::test_utils::platform_with("p2", &[("root", "/srv/p2")]);
    let errors = platform.resolve_dependencies(&registry);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        ProvisionError::UnresolvedCapability(_)
    ));
}
