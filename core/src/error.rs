//! Error types for the Zotero API client.
//!
//! # Design
//! Builder misuse is split in two: `BadMethodCall` when a call arrives in a
//! scope that does not allow it, `InvalidParameter` when an argument fails
//! its domain check. Transport and decoding failures are carried as the
//! underlying library error, unchanged.

use thiserror::Error;

/// Errors returned by `PathBuilder` and `ZoteroApi`.
#[derive(Error, Debug)]
pub enum ZoteroError {
    /// A method was called out of order, or an accessor ran before `send()`.
    #[error("bad method call: {0}")]
    BadMethodCall(String),

    /// An argument was outside the accepted set or range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The HTTP round-trip failed (network, timeout, or non-2xx status).
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    /// The response body is not valid JSON for the requested type.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Zotero client operations.
pub type Result<T> = std::result::Result<T, ZoteroError>;
