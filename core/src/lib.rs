//! Synchronous client core for the Zotero Web API.
//!
//! # Overview
//! Builds request paths through a chain of validated calls and sends one
//! GET per `send()`:
//!
//! ```no_run
//! # fn main() -> zotero_core::Result<()> {
//! let mut api = zotero_core::ZoteroApi::new("api-key");
//! api.user(12345)?.items()?.top()?.limit(20)?.send()?;
//! println!("{}", api.json()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `PathBuilder` validates call order with an explicit `Scope` state
//!   rather than by inspecting the accumulated path.
//! - `Transport` is the I/O seam. `UreqTransport` is the blocking default;
//!   tests inject fakes.
//! - Errors are split into call-order misuse, bad arguments, and the
//!   unchanged transport/JSON errors underneath.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod path;
pub mod types;

pub use client::ZoteroApi;
pub use config::{ClientConfig, API_BASE_URL};
pub use error::{Result, ZoteroError};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use path::{Library, PathBuilder, Scope};
pub use types::{Direction, NumericArg, SortField};
