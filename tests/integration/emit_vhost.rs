//! Vhost emission from verified state.

use crate::integration::test_utils::text_options;
use std::collections::BTreeMap;
use stratum::context::{Context, ContextKind};
use stratum::emit::render_site_vhost;
use stratum::error::ProvisionError;
use stratum::exec::OfflineProbe;
use stratum::property::PropertyValue;
use stratum::store::ContextRecord;

fn verified_record(
    name: &str,
    kind: ContextKind,
    options: BTreeMap<String, PropertyValue>,
) -> ContextRecord {
    let mut context = Context::new(name, kind, options);
    let errors = context.configure(&OfflineProbe);
    assert!(errors.is_empty(), "configure errors: {:?}", errors);
    context.mark_verified();
    ContextRecord::from_context(&context, None)
}

fn db_record() -> ContextRecord {
    let mut options = text_options(&[("hostname", "db1.internal")]);
    options.insert(
        "services".to_string(),
        PropertyValue::List(vec!["db".to_string()]),
    );
    options.insert("port".to_string(), PropertyValue::Integer(3307));
    verified_record("db1", ContextKind::Server, options)
}

#[test]
fn vhost_wires_site_platform_and_db_together() {
    let site = verified_record(
        "site1",
        ContextKind::Site,
        text_options(&[("uri", "shop.example.test")]),
    );
    let platform = verified_record(
        "p1",
        ContextKind::Platform,
        text_options(&[("root", "/srv/p1"), ("document_root", "web")]),
    );

    let vhost = render_site_vhost(&site, &platform, &db_record()).unwrap();
    assert!(vhost.contains("server_name   shop.example.test;"));
    assert!(vhost.contains("root          /srv/p1/web;"));
    assert!(vhost.contains("fastcgi_param db_host db1.internal;"));
    assert!(vhost.contains("fastcgi_param db_port 3307;"));
}

#[test]
fn unverified_provider_blocks_emission() {
    let site = verified_record(
        "site1",
        ContextKind::Site,
        text_options(&[("uri", "shop.example.test")]),
    );
    let mut platform = verified_record(
        "p1",
        ContextKind::Platform,
        text_options(&[("root", "/srv/p1")]),
    );
    platform.state = stratum::context::ContextState::Failed;

    let err = render_site_vhost(&site, &platform, &db_record()).unwrap_err();
    match err {
        ProvisionError::NotVerified { name, .. } => assert_eq!(name, "p1"),
        other => panic!("expected NotVerified, got {:?}", other),
    }
}

/// The emission boundary escapes on its own, even for values that the
/// schema validators would have rejected upstream.
#[test]
fn every_emitted_property_value_is_escaped() {
    let site = unvalidated_record(
        "site1",
        ContextKind::Site,
        &[("uri", "a b;include /etc/passwd;")],
    );
    let platform = verified_record(
        "p1",
        ContextKind::Platform,
        text_options(&[("root", "/srv/p1")]),
    );
    let db = unvalidated_record("db1", ContextKind::Server, &[("hostname", "db1;listen 81")]);

    let vhost = render_site_vhost(&site, &platform, &db).unwrap();
    assert!(!vhost.contains("include /etc/passwd"));
    assert!(!vhost.contains("listen 81"));
    assert!(vhost.contains("a%20b%3Binclude"));
}

fn unvalidated_record(name: &str, kind: ContextKind, entries: &[(&str, &str)]) -> ContextRecord {
    let mut properties = stratum::property::PropertyBag::new();
    for (key, value) in entries {
        properties.insert_unchecked(key, PropertyValue::Text(value.to_string()));
    }
    ContextRecord {
        name: name.to_string(),
        kind,
        state: stratum::context::ContextState::Verified,
        properties,
        resolved: BTreeMap::new(),
        last_report: None,
        updated_at: chrono::Utc::now(),
    }
}
