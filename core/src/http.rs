//! Transport seam: the capability `Request::execute` sends through.
//!
//! # Design
//! The core never talks to the network directly. It builds an
//! `http::Request<Vec<u8>>` and hands it to a `Transport`, which returns the
//! status, headers and an open body stream. `UreqTransport` is the default;
//! tests plug in an in-memory implementation.
//!
//! The body stream is single-consumer. Reading one `Response` body from two
//! threads at once is the caller's problem; nothing here guards against it.

use std::fmt;
use std::io::Read;

pub use ureq::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

use crate::error::Error;

/// Owned response body as handed over by a transport.
pub type BodyStream = Box<dyn Read + Send>;

/// Sends a fully-built request and returns the response with its body unread.
///
/// Implementations must be safe to share across threads; the default one is
/// reused by every `execute` call in the process.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: ureq::http::Request<Vec<u8>>,
        proxy: Option<&Proxy>,
    ) -> Result<ureq::http::Response<BodyStream>, Error>;
}

const PROXY_SCHEMES: &[&str] = &["http", "https", "socks4", "socks4a", "socks5", "socks5h"];

/// A validated egress proxy address.
#[derive(Clone)]
pub struct Proxy {
    address: String,
    inner: ureq::Proxy,
}

impl Proxy {
    /// Validate `address` and prepare it for the transport.
    ///
    /// Accepts `host:port` or `scheme://[user:pass@]host[:port]` with one of
    /// the http, https, socks4, socks4a, socks5 or socks5h schemes.
    pub fn parse(address: &str) -> Result<Self, Error> {
        let invalid = |reason: String| Error::ProxyConfiguration {
            address: address.to_string(),
            reason,
        };

        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(invalid("address is empty".to_string()));
        }
        let uri: Uri = trimmed.parse().map_err(|e| invalid(format!("{e}")))?;
        if let Some(scheme) = uri.scheme_str() {
            if !PROXY_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
                return Err(invalid(format!("unsupported scheme `{scheme}`")));
            }
        }
        if uri.host().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        let normalized = if uri.scheme().is_some() {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
        let inner = ureq::Proxy::new(&normalized).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            address: trimmed.to_string(),
            inner,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub(crate) fn as_ureq(&self) -> &ureq::Proxy {
        &self.inner
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Proxy").field(&self.address).finish()
    }
}

impl PartialEq for Proxy {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}
