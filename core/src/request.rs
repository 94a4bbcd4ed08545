//! Request data model, dispatch, and the verb shortcuts.
//!
//! # Design
//! `Request` is plain data: the caller fills it in and calls `execute`. The
//! executor validates it, resolves the body through the codec dispatcher,
//! builds an `http::Request`, and sends it through a `Transport`. When a
//! decode target is attached the body is decoded right away; a decode failure
//! comes back as `Error::Decode` carrying the response.

use std::collections::HashMap;
use std::fmt;

use ureq::http::Request as HttpRequest;

use crate::codec::{self, Body, DataType};
use crate::error::Error;
use crate::http::{HeaderName, HeaderValue, Method, Proxy, Transport};
use crate::response::Response;
use crate::target::DecodeTarget;
use crate::transport::default_transport;
use crate::validate::validate_request;

/// An outbound HTTP call described as data.
pub struct Request<'a> {
    pub url: String,
    /// Case-insensitive; empty means `GET`.
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Body<'a>,
    pub request_data_type: DataType,
    /// Only consulted when `decode_target` is set.
    pub response_data_type: DataType,
    pub decode_target: Option<&'a mut dyn DecodeTarget>,
    proxy: Option<Proxy>,
}

impl<'a> Request<'a> {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            headers: HashMap::new(),
            body: Body::Empty,
            request_data_type: DataType::Raw,
            response_data_type: DataType::Raw,
            decode_target: None,
            proxy: None,
        }
    }

    /// Replace all headers.
    pub fn set_headers(&mut self, headers: HashMap<String, String>) {
        self.headers = headers;
    }

    /// Route this request through `address`. On error the proxy is left as
    /// it was.
    pub fn set_proxy(&mut self, address: &str) -> Result<(), Error> {
        self.proxy = Some(Proxy::parse(address)?);
        Ok(())
    }

    pub fn clear_proxy(&mut self) {
        self.proxy = None;
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.set_headers(headers);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Body<'a>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_request_data_type(mut self, data_type: impl Into<DataType>) -> Self {
        self.request_data_type = data_type.into();
        self
    }

    /// Decode the response into `target` as part of `execute`.
    pub fn with_decode_target(
        mut self,
        data_type: impl Into<DataType>,
        target: &'a mut dyn DecodeTarget,
    ) -> Self {
        self.response_data_type = data_type.into();
        self.decode_target = Some(target);
        self
    }

    /// Upper-cased method, `GET` when unset.
    pub fn resolved_method(&self) -> String {
        let method = self.method.trim();
        if method.is_empty() {
            return "GET".to_string();
        }
        method.to_ascii_uppercase()
    }

    /// Send through the process-wide default transport.
    pub fn execute(self) -> Result<Response, Error> {
        self.execute_with(default_transport())
    }

    /// Send through `transport`.
    pub fn execute_with(self, transport: &dyn Transport) -> Result<Response, Error> {
        validate_request(&self)?;
        let outbound = self.build()?;

        tracing::debug!(
            method = %outbound.method(),
            url = %outbound.uri(),
            proxy = self.proxy.as_ref().map(Proxy::address),
            body_len = outbound.body().len(),
            "dispatching request"
        );
        let mut response = Response::from(transport.send(outbound, self.proxy.as_ref())?);
        tracing::debug!(status = response.status_code(), url = %self.url, "response received");

        let Some(target) = self.decode_target else {
            return Ok(response);
        };
        match response.decode(&self.response_data_type, target) {
            Ok(()) => Ok(response),
            Err(source) => {
                tracing::warn!(
                    status = response.status_code(),
                    response_type = %self.response_data_type,
                    error = %source,
                    "failed to decode response"
                );
                Err(Error::Decode {
                    response: Box::new(response),
                    source: Box::new(source),
                })
            }
        }
    }

    fn build(&self) -> Result<HttpRequest<Vec<u8>>, Error> {
        let method = Method::from_bytes(self.resolved_method().as_bytes())
            .map_err(|e| Error::RequestConstruction(format!("invalid method `{}`: {e}", self.method)))?;
        let body = codec::resolve_body(&self.request_data_type, &self.body)?;

        let mut request = HttpRequest::builder()
            .method(method)
            .uri(self.url.trim())
            .body(body)
            .map_err(|e| Error::RequestConstruction(format!("invalid url `{}`: {e}", self.url)))?;
        if request.uri().scheme().is_none() || request.uri().authority().is_none() {
            return Err(Error::RequestConstruction(format!(
                "invalid url `{}`: scheme and host are required",
                self.url
            )));
        }

        let headers = request.headers_mut();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::RequestConstruction(format!("invalid header name `{name}`: {e}")))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                Error::RequestConstruction(format!("invalid value for header `{name}`: {e}"))
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(request)
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("request_data_type", &self.request_data_type)
            .field("response_data_type", &self.response_data_type)
            .field(
                "decode_target",
                &self.decode_target.as_ref().map(|t| t.target_type()),
            )
            .field("proxy", &self.proxy)
            .finish()
    }
}

pub fn get(url: &str) -> Result<Response, Error> {
    Request::new("GET", url).execute()
}

pub fn delete(url: &str) -> Result<Response, Error> {
    Request::new("DELETE", url).execute()
}

pub fn post(url: &str, data: impl Into<Vec<u8>>) -> Result<Response, Error> {
    Request::new("POST", url).with_body(Body::Raw(data.into())).execute()
}

pub fn put(url: &str, data: impl Into<Vec<u8>>) -> Result<Response, Error> {
    Request::new("PUT", url).with_body(Body::Raw(data.into())).execute()
}

pub fn patch(url: &str, data: impl Into<Vec<u8>>) -> Result<Response, Error> {
    Request::new("PATCH", url).with_body(Body::Raw(data.into())).execute()
}

/// Build and execute a request in one call.
///
/// `decode_target` together with `response_data_type` makes the body be
/// decoded before returning, exactly like `Request::with_decode_target`.
pub fn make(
    method: &str,
    url: &str,
    data: impl Into<Vec<u8>>,
    request_data_type: impl Into<DataType>,
    response_data_type: impl Into<DataType>,
    decode_target: Option<&mut dyn DecodeTarget>,
    headers: HashMap<String, String>,
) -> Result<Response, Error> {
    let request = Request {
        response_data_type: response_data_type.into(),
        decode_target,
        ..Request::new(method, url)
            .with_body(Body::Raw(data.into()))
            .with_request_data_type(request_data_type)
            .with_headers(headers)
    };
    request.execute()
}
