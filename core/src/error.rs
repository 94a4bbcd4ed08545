//! Error type for request building, dispatch and response decoding.
//!
//! # Design
//! Every fallible operation in the crate returns `Result<_, Error>`. Errors
//! that originate in a collaborator (codec, transport, filesystem) keep the
//! underlying cause, either as a `#[source]` or as its rendered message when
//! the collaborator's error type is not worth exposing.
//!
//! A decode failure inside `Request::execute` does not invalidate the HTTP
//! exchange, so `Decode` hands the `Response` back alongside the cause.

use std::io;
use std::path::PathBuf;

use crate::response::Response;

/// Errors returned by `reqkit`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request has an empty URL.
    #[error("no url specified")]
    MissingUrl,

    /// The request body could not be marshaled for its declared data type.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be unmarshaled into the decode target.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A text response type was declared for a target that cannot hold text.
    #[error("non-string target `{found}` for a text response type")]
    NonStringTarget { found: &'static str },

    /// Decoding needs both a response data type and a target.
    #[error("no response data type provided")]
    MissingDecodeSpec,

    /// The response data type tag is not one of json, xml, string, text, html.
    #[error("unknown response data type `{0}`")]
    UnknownResponseType(String),

    /// Method, URL or a header could not form a valid HTTP request.
    #[error("could not construct request: {0}")]
    RequestConstruction(String),

    /// Network-level failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The proxy address is malformed or uses an unsupported scheme.
    #[error("invalid proxy address `{address}`: {reason}")]
    ProxyConfiguration { address: String, reason: String },

    /// Creating or writing the download target failed.
    #[error("file system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the response body stream failed.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] io::Error),

    /// The response body was read after `Response::close`.
    #[error("response body already closed")]
    BodyClosed,

    /// The exchange succeeded but decoding into the declared target failed.
    #[error("decoding response failed: {source}")]
    Decode {
        response: Box<Response>,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The response carried by a `Decode` error, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Take back the response carried by a `Decode` error.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Error::Decode { response, .. } => Some(*response),
            _ => None,
        }
    }

    /// For `Decode`, the underlying decode error; otherwise `self`.
    pub fn cause(&self) -> &Error {
        match self {
            Error::Decode { source, .. } => source,
            other => other,
        }
    }
}
