//! Config emission: renders web-server configuration artifacts from
//! verified context state.
//!
//! This is the most security-sensitive boundary in the system: every
//! property value that reaches an output artifact originates from
//! user-supplied configuration and is escaped for the output format before
//! it is written.

mod nginx;

pub use nginx::render_site_vhost;

/// Percent-encode a property value for embedding in a configuration
/// artifact. Everything outside ASCII alphanumerics and `-_.~` is encoded.
pub fn escape_value(raw: &str) -> String {
    escape(raw, false)
}

/// Like [`escape_value`] but keeps `/` literal, for filesystem paths.
pub fn escape_path(raw: &str) -> String {
    escape(raw, true)
}

fn escape(raw: &str, keep_separator: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if keep_separator => out.push('/'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}
