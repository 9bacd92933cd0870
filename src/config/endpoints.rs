//! Backend URL resolution.
//!
//! The base URL is picked once at startup: an explicit override wins, a client
//! served from a non-local host talks to its own origin, and everything else
//! falls back to the local development backend. Path helpers never validate
//! their input; malformed strings pass through.

use reqwest::Url;
use tracing::debug;

use super::types::ConfigV1;

/// Backend address used when running on a local development host.
pub const LOCAL_API_URL: &str = "http://localhost:8000";

const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

/// The page the client is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub hostname: String,
    pub origin: String,
}

impl PageLocation {
    /// Parses an origin such as `https://app.example.com:8443`.
    pub fn parse(origin: &str) -> Option<Self> {
        let url = Url::parse(origin).ok()?;
        let hostname = url.host_str()?.to_string();
        Some(PageLocation {
            hostname,
            origin: url.origin().ascii_serialization(),
        })
    }

    pub fn is_local(&self) -> bool {
        LOCAL_HOSTS.contains(&self.hostname.as_str())
    }
}

/// Picks the backend base URL from the override, the page location, or the local default.
pub fn resolve_base_url(api_url: Option<&str>, page: Option<&PageLocation>) -> String {
    if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
        return url.trim().to_string();
    }
    match page {
        Some(location) if !location.is_local() => location.origin.clone(),
        _ => LOCAL_API_URL.to_string(),
    }
}

/// True when `path` already starts with a URL scheme (`https://...`, `ws://...`).
pub fn has_scheme(path: &str) -> bool {
    match path.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Collapses any leading slashes into exactly one.
fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Rewrites a leading `http` scheme to `ws` (and `https` to `wss`).
fn to_ws_scheme(url: &str) -> String {
    match url.strip_prefix("http") {
        Some(rest) => format!("ws{rest}"),
        None => url.to_string(),
    }
}

/// Builds absolute HTTP and WebSocket URLs against a fixed base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base_url: String,
}

impl ApiEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        ApiEndpoints {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ConfigV1) -> Self {
        let page = config.page_origin.as_deref().and_then(PageLocation::parse);
        let base_url = resolve_base_url(config.api_url.as_deref(), page.as_ref());
        debug!("Resolved backend base URL: {}", base_url);
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn to_absolute_url(&self, path: &str) -> String {
        if has_scheme(path) {
            return path.to_string();
        }
        format!("{}{}", self.base_url, normalize_path(path))
    }

    pub fn to_websocket_url(&self, path: &str) -> String {
        if has_scheme(path) {
            return to_ws_scheme(path);
        }
        format!("{}{}", to_ws_scheme(&self.base_url), normalize_path(path))
    }
}
