//! Nginx vhost rendering for verified sites.

use crate::context::ContextState;
use crate::emit::{escape_path, escape_value};
use crate::error::ProvisionError;
use crate::property::PropertyValue;
use crate::store::ContextRecord;

/// Render an nginx server block for a verified site.
///
/// The document root comes from the site's platform provider; the fastcgi
/// database parameters come from its db provider. Rendering refuses any
/// record that has not reached Verified — emitting configuration for
/// unproven state would point the web server at paths nobody checked.
pub fn render_site_vhost(
    site: &ContextRecord,
    platform: &ContextRecord,
    db_server: &ContextRecord,
) -> Result<String, ProvisionError> {
    for record in [site, platform, db_server] {
        if record.state != ContextState::Verified {
            return Err(ProvisionError::NotVerified {
                name: record.name.clone(),
                state: record.state.to_string(),
            });
        }
    }

    let uri = site
        .properties
        .get("uri")
        .and_then(PropertyValue::as_text)
        .ok_or_else(|| ProvisionError::MissingRequiredProperty("uri".to_string()))?;
    let document_root = platform
        .properties
        .get("document_root")
        .and_then(PropertyValue::as_text)
        .ok_or_else(|| ProvisionError::MissingRequiredProperty("document_root".to_string()))?;
    let db_host = db_server
        .properties
        .get("hostname")
        .and_then(PropertyValue::as_text)
        .ok_or_else(|| ProvisionError::MissingRequiredProperty("hostname".to_string()))?;
    let db_port = match db_server.properties.get("port") {
        Some(PropertyValue::Integer(port)) => port.to_string(),
        Some(other) => other.to_string(),
        None => "3306".to_string(),
    };

    let uri = escape_value(uri);
    let root = escape_path(document_root);
    let db_name = escape_value(&site.name);
    let db_host = escape_value(db_host);
    let db_port = escape_value(&db_port);

    Ok(format!(
        r#"#######################################################
###  nginx vhost for {uri}
#######################################################

server {{
  listen        80;
  server_name   {uri};
  root          {root};

  ### Deny not compatible request methods without 405 response.
  if ( $request_method !~ ^(?:GET|HEAD|POST|PUT|DELETE|OPTIONS)$ ) {{
    return 403;
  }}

  ### If favicon else return error 204.
  location = /favicon.ico {{
    access_log    off;
    log_not_found off;
    expires       30d;
    try_files     /sites/{uri}/files/favicon.ico $uri =204;
  }}

  location = /robots.txt {{
    access_log    off;
    log_not_found off;
    try_files     /sites/{uri}/files/robots.txt $uri =404;
  }}

  location / {{
    include       fastcgi_params;
    fastcgi_param db_name {db_name};
    fastcgi_param db_host {db_host};
    fastcgi_param db_port {db_port};
    fastcgi_pass  127.0.0.1:9000;
  }}
}}
"#
    ))
}
