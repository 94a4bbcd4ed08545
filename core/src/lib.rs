//! Blocking HTTP convenience layer: describe a request as data, send it, and
//! decode the response body into a typed value.
//!
//! # Overview
//! A `Request` carries URL, method, headers, a body and optional data-type
//! tags. `execute` validates it, marshals the body for its declared data type,
//! sends it through a `Transport`, and returns a `Response` whose body is
//! still open. If a decode target was attached the body is decoded first.
//!
//! # Design
//! - The network is reached only through the `Transport` trait. The default
//!   implementation wraps a shared ureq agent built once per process; tests
//!   inject their own.
//! - JSON and XML are delegated to serde_json and quick-xml. The crate only
//!   decides which codec applies and whether bytes pass through untouched.
//! - Response bodies are single-consumer streams owned by `Response`.
//!
//! ```no_run
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Status {
//!     ok: bool,
//! }
//!
//! let mut status = Status::default();
//! let response = reqkit::Request::new("get", "https://example.test/status")
//!     .with_decode_target("json", &mut status)
//!     .execute()?;
//! assert_eq!(response.status_code(), 200);
//! # Ok::<(), reqkit::Error>(())
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod target;
pub mod transport;
pub mod validate;

pub use codec::{Body, DataType};
pub use config::TransportConfig;
pub use error::Error;
pub use http::{BodyStream, Proxy, Transport};
pub use request::{delete, get, make, patch, post, put, Request};
pub use response::{DownloadResult, Response};
pub use target::{DecodeTarget, TextSlot};
pub use transport::{default_transport, UreqTransport};
