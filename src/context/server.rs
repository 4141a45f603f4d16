//! Server contexts: machines that provide service capabilities (http, db)
//! to platforms and sites.

use crate::context::Context;
use crate::error::ProvisionError;
use crate::property::{PropertyDescriptor, PropertyValue, Validator};
use crate::task::{Task, TaskAction};
use std::path::PathBuf;

pub(super) fn schema() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor {
            name: "hostname",
            description: "server: host name or address this server answers on.",
            default: Some(PropertyValue::Text("localhost".to_string())),
            required: true,
            validator: Validator::HostName,
        },
        PropertyDescriptor {
            name: "services",
            description: "server: service capabilities this server provides (e.g. http, db).",
            default: Some(PropertyValue::List(vec!["http".to_string()])),
            required: true,
            validator: Validator::Accept,
        },
        PropertyDescriptor {
            name: "port",
            description: "server: primary service port (e.g. 80 for http, 3306 for db).",
            default: None,
            required: false,
            validator: Validator::Accept,
        },
        PropertyDescriptor {
            name: "config_root",
            description: "server: directory where emitted server configuration is written.",
            default: Some(default_config_root()),
            required: true,
            validator: Validator::AbsolutePath,
        },
    ]
}

fn default_config_root() -> PropertyValue {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    PropertyValue::Text(cwd.join("config").display().to_string())
}

pub(super) fn plan(context: &Context) -> Result<Vec<Task>, ProvisionError> {
    let config_root = context
        .property_path("config_root")
        .ok_or_else(|| ProvisionError::MissingRequiredProperty("config_root".to_string()))?;

    Ok(vec![
        Task::new(
            "server.config",
            "Ensuring configuration directory",
            TaskAction::EnsureDirectory {
                path: config_root.clone(),
            },
        ),
        Task::new(
            "server.found",
            "Checking configuration directory",
            TaskAction::PathPresent { path: config_root },
        ),
    ])
}
