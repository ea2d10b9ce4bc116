//! Fluent Zotero API client.
//!
//! # Design
//! `ZoteroApi` owns a `PathBuilder`, the client settings, and a `Transport`.
//! Path methods validate and append through the builder and return
//! `&mut Self` so calls chain with `?`. `send()` is the only method that
//! performs I/O; the response it stores backs every accessor until the next
//! `send()`.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::{self, ClientConfig};
use crate::error::{Result, ZoteroError};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::path::PathBuilder;
use crate::types::NumericArg;

/// Client for one Zotero API request/response cycle at a time.
///
/// A single instance keeps one path and one stored response, so it is not
/// meant to be shared between concurrent requests.
#[derive(Debug)]
pub struct ZoteroApi<T = UreqTransport> {
    api_key: String,
    config: ClientConfig,
    path: PathBuilder,
    transport: T,
    response: Option<HttpResponse>,
}

impl ZoteroApi<UreqTransport> {
    pub fn new(api_key: &str) -> Self {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(api_key: &str, config: ClientConfig) -> Self {
        Self::with_transport(api_key, config, UreqTransport)
    }
}

impl<T: Transport> ZoteroApi<T> {
    pub fn with_transport(api_key: &str, config: ClientConfig, transport: T) -> Self {
        Self {
            api_key: api_key.to_string(),
            config,
            path: PathBuilder::new(),
            transport,
            response: None,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn version(&self) -> u32 {
        self.config.version
    }

    pub fn set_version(&mut self, version: u32) -> &mut Self {
        self.config.version = version;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connection_timeout(&self) -> Duration {
        self.config.connection_timeout
    }

    pub fn set_connection_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.config.connection_timeout = timeout;
        self
    }

    pub fn delay(&self) -> Duration {
        self.config.delay
    }

    pub fn set_delay(&mut self, delay: Duration) -> &mut Self {
        self.config.delay = delay;
        self
    }

    pub fn format(&self) -> &str {
        &self.config.format
    }

    pub fn set_format(&mut self, format: &str) -> &mut Self {
        self.config.format = format.to_string();
        self
    }

    pub fn path(&self) -> Option<&str> {
        self.path.path()
    }

    /// Replace the request path without any validation.
    pub fn set_path(&mut self, path: &str) -> &mut Self {
        self.path.set_path(path);
        self
    }

    // -----------------------------------------------------------------------
    // Path building
    // -----------------------------------------------------------------------

    pub fn raw(&mut self, path: &str) -> Result<&mut Self> {
        self.path.raw(path)?;
        Ok(self)
    }

    pub fn user(&mut self, user_id: u64) -> Result<&mut Self> {
        self.path.user(user_id)?;
        Ok(self)
    }

    pub fn group(&mut self, group_id: u64) -> Result<&mut Self> {
        self.path.group(group_id)?;
        Ok(self)
    }

    /// The user id and privileges of `api_key`.
    pub fn key(&mut self, api_key: &str) -> Result<&mut Self> {
        self.path.key(api_key)?;
        Ok(self)
    }

    /// All items in the library, or in the collection opened before.
    pub fn items(&mut self) -> Result<&mut Self> {
        self.path.items()?;
        Ok(self)
    }

    pub fn item(&mut self, key: &str) -> Result<&mut Self> {
        self.path.item(key)?;
        Ok(self)
    }

    /// Top-level items or collections only.
    pub fn top(&mut self) -> Result<&mut Self> {
        self.path.top()?;
        Ok(self)
    }

    pub fn trash(&mut self) -> Result<&mut Self> {
        self.path.trash()?;
        Ok(self)
    }

    /// Child items of the item opened with `item(key)`.
    pub fn children(&mut self) -> Result<&mut Self> {
        self.path.children()?;
        Ok(self)
    }

    pub fn tags(&mut self) -> Result<&mut Self> {
        self.path.tags()?;
        Ok(self)
    }

    pub fn tag(&mut self, tag: &str) -> Result<&mut Self> {
        self.path.tag(tag)?;
        Ok(self)
    }

    pub fn collections(&mut self) -> Result<&mut Self> {
        self.path.collections()?;
        Ok(self)
    }

    pub fn collection(&mut self, key: &str) -> Result<&mut Self> {
        self.path.collection(key)?;
        Ok(self)
    }

    pub fn sub_collections(&mut self) -> Result<&mut Self> {
        self.path.sub_collections()?;
        Ok(self)
    }

    /// Saved searches in the library.
    pub fn searches(&mut self) -> Result<&mut Self> {
        self.path.searches()?;
        Ok(self)
    }

    pub fn search(&mut self, key: &str) -> Result<&mut Self> {
        self.path.search(key)?;
        Ok(self)
    }

    /// Groups the API key has access to, including public groups the key
    /// owner belongs to.
    pub fn groups(&mut self) -> Result<&mut Self> {
        self.path.groups()?;
        Ok(self)
    }

    pub fn sort_by(&mut self, field: &str) -> Result<&mut Self> {
        self.path.sort_by(field)?;
        Ok(self)
    }

    pub fn direction(&mut self, value: &str) -> Result<&mut Self> {
        self.path.direction(value)?;
        Ok(self)
    }

    pub fn limit(&mut self, value: impl NumericArg) -> Result<&mut Self> {
        self.path.limit(value)?;
        Ok(self)
    }

    pub fn start(&mut self, value: impl NumericArg) -> Result<&mut Self> {
        self.path.start(value)?;
        Ok(self)
    }

    /// Key-to-version map for every object in the listing. Not limited by
    /// the API.
    pub fn versions(&mut self) -> Result<&mut Self> {
        self.path.versions()?;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Build the GET request for the current path.
    pub fn request(&self) -> Result<HttpRequest> {
        let path = self.path.path().ok_or_else(|| {
            ZoteroError::BadMethodCall("send() has to be called after a path has been built".to_string())
        })?;
        Ok(HttpRequest {
            url: self.config.url_for(path),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
                ("Zotero-API-Version".to_string(), self.config.version.to_string()),
            ],
            timeout: config::limit(self.config.timeout),
            connect_timeout: config::limit(self.config.connection_timeout),
        })
    }

    /// Send the request and keep the response for the accessors.
    pub fn send(&mut self) -> Result<&mut Self> {
        let request = self.request()?;
        if !self.config.delay.is_zero() {
            log::debug!("delaying request by {:?}", self.config.delay);
            std::thread::sleep(self.config.delay);
        }

        log::debug!("GET {}", request.url);
        let response = self.transport.execute(&request)?;
        log::debug!("{} {} for {}", response.status, response.reason, request.url);

        self.response = Some(response);
        Ok(self)
    }

    pub fn status_code(&self) -> Result<u16> {
        Ok(self.response("status_code")?.status)
    }

    /// Canonical reason phrase for the status code.
    pub fn reason_phrase(&self) -> Result<&str> {
        Ok(&self.response("reason_phrase")?.reason)
    }

    /// Response headers, with repeated headers collected in arrival order.
    pub fn headers(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let response = self.response("headers")?;
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in &response.headers {
            headers.entry(name.clone()).or_default().push(value.clone());
        }
        Ok(headers)
    }

    /// The response body decoded as JSON.
    pub fn body(&self) -> Result<serde_json::Value> {
        self.body_as()
    }

    pub fn body_as<D: DeserializeOwned>(&self) -> Result<D> {
        let response = self.response("body")?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// The response body as the raw JSON string.
    pub fn json(&self) -> Result<&str> {
        Ok(&self.response("json")?.body)
    }

    fn response(&self, accessor: &str) -> Result<&HttpResponse> {
        self.response.as_ref().ok_or_else(|| {
            ZoteroError::BadMethodCall(format!("cannot call {accessor}() before send()"))
        })
    }
}
