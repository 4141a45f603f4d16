//! Platform contexts: application codebases provisioned from source
//! control or built from a manifest, served by an http server.

use crate::context::Context;
use crate::error::ProvisionError;
use crate::exec::contains_files;
use crate::property::{PropertyBag, PropertyDescriptor, PropertyValue, Validator};
use crate::task::{Task, TaskAction};
use std::path::PathBuf;

pub(super) fn schema() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor {
            name: "root",
            description:
                "platform: path to the source code for this platform. May be relative or \
                 absolute, and may differ from the document root.",
            default: Some(default_root()),
            required: true,
            validator: Validator::AbsolutePath,
        },
        PropertyDescriptor {
            name: "makefile",
            description: "platform: build manifest used to build the platform. May be a path \
                          or URL.",
            default: None,
            required: false,
            validator: Validator::ManifestSource,
        },
        PropertyDescriptor {
            name: "make_working_copy",
            description: "platform: build with the build tool's working-copy mode.",
            default: None,
            required: false,
            validator: Validator::Accept,
        },
        PropertyDescriptor {
            name: "git_url",
            description: "platform: git repository remote URL.",
            default: None,
            required: false,
            validator: Validator::GitRemote,
        },
        PropertyDescriptor {
            name: "document_root",
            description: "platform: relative path to the document root within the source \
                          code. Leave blank if the docroot is the root.",
            default: None,
            required: false,
            validator: Validator::Accept,
        },
    ]
}

fn default_root() -> PropertyValue {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    PropertyValue::Text(cwd.display().to_string())
}

/// Make the document root absolute: `root/document_root` when a relative
/// docroot is declared, else the root itself.
pub(super) fn finalize(properties: &mut PropertyBag) {
    let root = match properties.get("root").and_then(PropertyValue::as_path) {
        Some(root) => root,
        None => return,
    };
    let document_root = match properties
        .get("document_root")
        .and_then(PropertyValue::as_text)
        .filter(|rel| !rel.trim().is_empty())
    {
        Some(rel) => root.join(rel),
        None => root,
    };
    properties.insert_unchecked(
        "document_root",
        PropertyValue::Text(document_root.display().to_string()),
    );
}

/// Plan the platform's remediation tasks.
///
/// At most one of clone/build is planned per pass, and only when the root
/// does not yet contain files; a configured git_url takes precedence over a
/// makefile. The final existence check always runs and is the
/// authoritative success signal.
pub(super) fn plan(context: &Context) -> Result<Vec<Task>, ProvisionError> {
    let root = context
        .property_path("root")
        .ok_or_else(|| ProvisionError::MissingRequiredProperty("root".to_string()))?;

    let mut tasks = Vec::new();

    if !contains_files(&root) {
        let git_url = context
            .property_text("git_url")
            .filter(|url| !url.trim().is_empty());
        let makefile = context
            .property_text("makefile")
            .filter(|m| !m.trim().is_empty());

        if let Some(url) = git_url {
            tasks.push(Task::new(
                "platform.git",
                "Cloning git repository",
                TaskAction::CloneRepository {
                    url: url.to_string(),
                    target: root.clone(),
                },
            ));
        } else if let Some(manifest) = makefile {
            tasks.push(Task::new(
                "platform.make",
                "Building platform from manifest",
                TaskAction::BuildFromManifest {
                    manifest: manifest.to_string(),
                    target: root.clone(),
                    working_copy: context.property_flag("make_working_copy").unwrap_or(false),
                },
            ));
        }
    }

    tasks.push(Task::new(
        "platform.found",
        "Checking root path for files",
        TaskAction::PathPresent { path: root },
    ));

    Ok(tasks)
}
