//! Response wrapper and body decoding.
//!
//! # Design
//! `Response` owns the open body stream handed back by the transport. The
//! body is read at most once: by a decode, by `read_body`, by
//! `download_to_file`, or by the caller through `body_stream`. Nothing closes
//! it automatically before the `Response` is dropped; `close` releases it
//! early while status and headers stay available.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use crate::codec::{self, DataType};
use crate::error::Error;
use crate::http::{BodyStream, HeaderMap, StatusCode};
use crate::target::DecodeTarget;
use crate::validate::validate_text_target;

/// Outcome of `Response::download_to_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadResult {
    pub bytes_copied: u64,
    pub download_time: Duration,
}

/// A received HTTP response with its body still unread.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<BodyStream>,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            status,
            headers,
            body: Some(body),
        }
    }

    /// Numeric status, e.g. `200`.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Status line text, e.g. `"200 OK"`.
    pub fn status(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {reason}", self.status.as_str()),
            None => self.status.as_str().to_string(),
        }
    }

    /// All response headers; repeated names keep every value in order.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of `name`, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The open body stream for incremental reads.
    pub fn body_stream(&mut self) -> Result<&mut BodyStream, Error> {
        self.body.as_mut().ok_or(Error::BodyClosed)
    }

    /// Read the remainder of the body into memory.
    pub fn read_body(&mut self) -> Result<Vec<u8>, Error> {
        let body = self.body_stream()?;
        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes).map_err(Error::BodyRead)?;
        Ok(bytes)
    }

    /// Release the body stream. Later reads fail with `BodyClosed`;
    /// closing twice is a no-op.
    pub fn close(&mut self) {
        if self.body.take().is_some() {
            tracing::trace!(status = self.status_code(), "response body closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.body.is_none()
    }

    /// Stream the remaining body into a newly created file at `path`.
    pub fn download_to_file(&mut self, path: impl AsRef<Path>) -> Result<DownloadResult, Error> {
        let path = path.as_ref();
        let started = Instant::now();
        let body = self.body_stream()?;
        let fs_error = |source: io::Error| Error::FileSystem {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::create(path).map_err(fs_error)?;
        let bytes_copied = io::copy(body, &mut file).map_err(fs_error)?;
        let result = DownloadResult {
            bytes_copied,
            download_time: started.elapsed(),
        };
        tracing::debug!(
            path = %path.display(),
            bytes = result.bytes_copied,
            elapsed_ms = result.download_time.as_millis() as u64,
            "download complete"
        );
        Ok(result)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        codec::unmarshal_json(&self.read_body()?)
    }

    /// Decode the body as XML.
    pub fn xml<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        codec::unmarshal_xml(&self.read_body()?)
    }

    /// The body as UTF-8 text.
    pub fn text(&mut self) -> Result<String, Error> {
        String::from_utf8(self.read_body()?)
            .map_err(|e| Error::Deserialization(format!("body is not valid utf-8: {e}")))
    }

    /// Decode the body into `target` according to `data_type`.
    ///
    /// `Raw` means no response type was declared and fails with
    /// `MissingDecodeSpec`. A text type is checked against the target before
    /// any byte of the body is read.
    pub fn decode(
        &mut self,
        data_type: &DataType,
        target: &mut dyn DecodeTarget,
    ) -> Result<(), Error> {
        match data_type {
            DataType::Raw => Err(Error::MissingDecodeSpec),
            DataType::Json => {
                let body = self.read_body()?;
                target.decode_json(&body)
            }
            DataType::Xml => {
                let body = self.read_body()?;
                target.decode_xml(&body)
            }
            DataType::Text => {
                let slot = validate_text_target(target)?;
                let body = self.read_body()?;
                slot.fill(body)
            }
            DataType::Unknown(tag) => Err(Error::UnknownResponseType(tag.clone())),
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl From<ureq::http::Response<BodyStream>> for Response {
    fn from(response: ureq::http::Response<BodyStream>) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde::Deserialize;

    use super::*;
    use crate::http::HeaderValue;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Record {
        a: i64,
    }

    fn response(status: u16, body: &[u8]) -> Response {
        Response::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Box::new(Cursor::new(body.to_vec())),
        )
    }

    #[test]
    fn status_text_includes_reason() {
        assert_eq!(response(200, b"").status(), "200 OK");
        assert_eq!(response(404, b"").status(), "404 Not Found");
        assert_eq!(response(599, b"").status(), "599");
        assert_eq!(response(201, b"").status_code(), 201);
    }

    #[test]
    fn repeated_headers_keep_all_values() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        let response = Response::new(StatusCode::OK, headers, Box::new(io::empty()));
        let values: Vec<_> = response.headers().get_all("set-cookie").iter().collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
        assert_eq!(response.header("Set-Cookie"), Some("a=1"));
    }

    #[test]
    fn body_is_consumed_once() {
        let mut response = response(200, b"payload");
        assert_eq!(response.read_body().unwrap(), b"payload");
        assert!(response.read_body().unwrap().is_empty());
    }

    #[test]
    fn reads_after_close_fail() {
        let mut response = response(200, b"payload");
        response.close();
        response.close();
        assert!(response.is_closed());
        assert!(matches!(response.read_body(), Err(Error::BodyClosed)));
        assert_eq!(response.status_code(), 200);
    }

    #[test]
    fn decode_json_into_record() {
        let mut record = Record::default();
        response(200, br#"{"a":1}"#)
            .decode(&DataType::Json, &mut record)
            .unwrap();
        assert_eq!(record, Record { a: 1 });
    }

    #[test]
    fn decode_malformed_json() {
        let mut record = Record::default();
        let err = response(200, b"{oops")
            .decode(&DataType::Json, &mut record)
            .unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn decode_text_into_string() {
        let mut text = String::from("stale");
        response(200, b"<p>hi</p>")
            .decode(&DataType::from_tag("html"), &mut text)
            .unwrap();
        assert_eq!(text, "<p>hi</p>");
    }

    #[test]
    fn decode_empty_text_body() {
        let mut text = String::from("stale");
        response(204, b"")
            .decode(&DataType::Text, &mut text)
            .unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn decode_text_into_bytes_is_exact() {
        let mut bytes: Vec<u8> = Vec::new();
        response(200, &[0xde, 0xad, 0xbe, 0xef])
            .decode(&DataType::Text, &mut bytes)
            .unwrap();
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn text_into_non_string_leaves_body_unread() {
        let mut response = response(200, b"body");
        let mut record = Record::default();
        let err = response.decode(&DataType::Text, &mut record).unwrap_err();
        assert!(matches!(err, Error::NonStringTarget { .. }));
        assert_eq!(response.read_body().unwrap(), b"body");
    }

    #[test]
    fn decode_needs_a_response_type() {
        let mut text = String::new();
        let err = response(200, b"x").decode(&DataType::Raw, &mut text).unwrap_err();
        assert!(matches!(err, Error::MissingDecodeSpec));
    }

    #[test]
    fn unknown_response_type() {
        let mut text = String::new();
        let err = response(200, b"x")
            .decode(&DataType::from_tag("yaml"), &mut text)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownResponseType(tag) if tag == "yaml"));
    }

    #[test]
    fn decode_xml_into_record() {
        let mut record = Record::default();
        response(200, b"<record><a>5</a></record>")
            .decode(&DataType::Xml, &mut record)
            .unwrap();
        assert_eq!(record, Record { a: 5 });
    }

    #[test]
    fn typed_json_helper() {
        let record: Record = response(200, br#"{"a":9}"#).json().unwrap();
        assert_eq!(record.a, 9);
    }

    #[test]
    fn download_reports_bytes_copied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        let payload = vec![7u8; 4096];
        let result = response(200, &payload).download_to_file(&path).unwrap();
        assert_eq!(result.bytes_copied, 4096);
        assert_eq!(std::fs::read(&path).unwrap(), payload);
    }

    #[test]
    fn download_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("payload.bin");
        let err = response(200, b"x").download_to_file(&path).unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }
}
