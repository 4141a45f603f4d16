//! Site contexts: installed sites living under a platform's document root,
//! backed by a database server.

use crate::context::{Context, ProviderMap};
use crate::error::ProvisionError;
use crate::property::{PropertyDescriptor, PropertyValue, Validator};
use crate::task::{Task, TaskAction};

pub(super) fn schema() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor {
            name: "uri",
            description: "site: canonical host name the site is served under.",
            default: None,
            required: true,
            validator: Validator::HostName,
        },
        PropertyDescriptor {
            name: "profile",
            description: "site: installation profile.",
            default: Some(PropertyValue::Text("standard".to_string())),
            required: false,
            validator: Validator::NonEmptyText,
        },
        PropertyDescriptor {
            name: "language",
            description: "site: default language code.",
            default: Some(PropertyValue::Text("en".to_string())),
            required: false,
            validator: Validator::NonEmptyText,
        },
    ]
}

/// Plan the site's tasks: its files directory lives under the providing
/// platform's document root at `sites/<uri>`.
pub(super) fn plan(context: &Context, providers: &ProviderMap) -> Result<Vec<Task>, ProvisionError> {
    let uri = context
        .property_text("uri")
        .ok_or_else(|| ProvisionError::MissingRequiredProperty("uri".to_string()))?;

    let platform = providers
        .get("platform")
        .ok_or_else(|| ProvisionError::UnresolvedCapability("platform".to_string()))?;
    let document_root = platform
        .properties
        .get("document_root")
        .and_then(PropertyValue::as_path)
        .ok_or_else(|| ProvisionError::MissingRequiredProperty("document_root".to_string()))?;

    let site_dir = document_root.join("sites").join(uri);

    Ok(vec![
        Task::new(
            "site.files",
            "Ensuring site directory",
            TaskAction::EnsureDirectory {
                path: site_dir.clone(),
            },
        ),
        Task::new(
            "site.found",
            "Checking site directory",
            TaskAction::PathPresent { path: site_dir },
        ),
    ])
}
