//! Company identity derived from a case study's source URL.
//!
//! Two case studies belong to the same company when their source URLs reduce to the same
//! `https://{host}`. Subdomains are kept as given.

use tracing::debug;
use url::Url;

/// Host portion of `raw`, or an empty string when it cannot be parsed or has no host.
pub fn extract_host(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_string(),
        Err(err) => {
            debug!(url = raw, %err, "unable to extract host");
            String::new()
        }
    }
}

/// Reduces `raw` to `https://{host}`, dropping scheme, port, credentials, path, query, and
/// fragment. Input that does not yield a host is returned unchanged.
///
/// The host is re-parsed under `https` so that the output is already canonical and feeding it
/// back in returns it as is.
pub fn clean_url(raw: &str) -> String {
    let host = extract_host(raw);
    if host.is_empty() {
        return raw.to_string();
    }

    match Url::parse(&format!("https://{host}")) {
        Ok(canonical) => match canonical.host_str() {
            Some(host) if !host.is_empty() => format!("https://{host}"),
            _ => raw.to_string(),
        },
        Err(err) => {
            debug!(url = raw, %err, "host does not form an https origin");
            raw.to_string()
        }
    }
}
