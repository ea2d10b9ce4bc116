//! Client configuration.

use std::time::Duration;

/// Base URL for all API requests.
pub const API_BASE_URL: &str = "https://api.zotero.org/";

/// API version sent in the `Zotero-API-Version` header by default.
pub const DEFAULT_API_VERSION: u32 = 3;

/// Settings applied to every request a `ZoteroApi` sends.
///
/// Zero durations mean "no timeout" and "no delay".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub version: u32,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    /// Pause before each request is dispatched.
    pub delay: Duration,
    /// Requested response format. Informational; the API defaults to JSON.
    pub format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            version: DEFAULT_API_VERSION,
            timeout: Duration::ZERO,
            connection_timeout: Duration::ZERO,
            delay: Duration::ZERO,
            format: "json".to_string(),
        }
    }
}

impl ClientConfig {
    /// Join the base URL and a request path with exactly one slash.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// `None` for a zero duration, which the transport reads as "no limit".
pub(crate) fn limit(duration: Duration) -> Option<Duration> {
    (!duration.is_zero()).then_some(duration)
}
