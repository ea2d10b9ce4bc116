//! HTTP transport seam for the Zotero client.
//!
//! # Design
//! Requests and responses are plain data. `ZoteroApi` builds an
//! `HttpRequest`, hands it to a `Transport`, and stores the `HttpResponse`
//! it gets back. The default transport is a blocking ureq agent; tests swap
//! in a fake that records requests and returns canned responses.

use std::time::Duration;

use crate::error::Result;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Overall deadline for the round-trip; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl HttpRequest {
    /// Value of the first header named `name` (ASCII case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// `headers` keeps one entry per received header line, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, not the text the server sent
    /// on its status line.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    /// Body text; invalid UTF-8 sequences are replaced with U+FFFD.
    pub body: String,
}

/// Executes one GET request.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking transport backed by ureq.
///
/// Non-2xx statuses are reported by ureq as `ureq::Error::StatusCode` and
/// propagate unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let agent = ureq::Agent::config_builder()
            .timeout_global(request.timeout)
            .timeout_connect(request.connect_timeout)
            .build()
            .new_agent();

        let mut builder = agent.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder.call()?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                (name.as_str().to_string(), value)
            })
            .collect();
        // Unpaged listings (`format=versions`) can exceed ureq's default cap.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
