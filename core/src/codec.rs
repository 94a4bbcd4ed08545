//! Data-type tags and the content-type-driven marshal/unmarshal dispatch.
//!
//! # Design
//! A request body is either raw bytes or a structured value. Raw bytes under
//! a `json`/`xml` tag are passed through when they already form a valid
//! document and rejected otherwise; they are never re-encoded. Structured
//! values are marshaled with the codec the tag selects, JSON when the tag
//! names no codec.

use std::fmt;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::error::Error;

/// Declared encoding of a request or response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DataType {
    /// No tag: bytes are sent as-is, and no response decode is declared.
    #[default]
    Raw,
    Json,
    Xml,
    /// `string`, `text` or `html`.
    Text,
    /// Any other tag, kept verbatim for error reporting.
    Unknown(String),
}

impl DataType {
    /// Parse a tag case-insensitively. Never fails; unrecognised tags become
    /// `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        let trimmed = tag.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => DataType::Raw,
            "json" => DataType::Json,
            "xml" => DataType::Xml,
            "string" | "text" | "html" => DataType::Text,
            _ => DataType::Unknown(trimmed.to_string()),
        }
    }
}

impl From<&str> for DataType {
    fn from(tag: &str) -> Self {
        DataType::from_tag(tag)
    }
}

impl From<String> for DataType {
    fn from(tag: String) -> Self {
        DataType::from_tag(&tag)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Raw => f.write_str(""),
            DataType::Json => f.write_str("json"),
            DataType::Xml => f.write_str("xml"),
            DataType::Text => f.write_str("text"),
            DataType::Unknown(tag) => f.write_str(tag),
        }
    }
}

type Marshal<'a> = Box<dyn Fn(&DataType) -> Result<Vec<u8>, Error> + Send + Sync + 'a>;

/// Outbound request body.
#[derive(Default)]
pub enum Body<'a> {
    #[default]
    Empty,
    /// Bytes sent unchanged unless the data type demands validation.
    Raw(Vec<u8>),
    /// A value marshaled on demand with the codec the data type selects.
    Structured(Marshal<'a>),
}

impl<'a> Body<'a> {
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Body::Raw(bytes.into())
    }

    pub fn structured<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'a,
    {
        Body::Structured(Box::new(move |data_type: &DataType| marshal(data_type, &value)))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Raw(bytes) => bytes.is_empty(),
            Body::Structured(_) => false,
        }
    }
}

impl fmt::Debug for Body<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Raw(bytes) => f.debug_tuple("Raw").field(&bytes.len()).finish(),
            Body::Structured(_) => f.write_str("Structured(..)"),
        }
    }
}

impl From<Vec<u8>> for Body<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Raw(bytes)
    }
}

impl From<&[u8]> for Body<'_> {
    fn from(bytes: &[u8]) -> Self {
        Body::Raw(bytes.to_vec())
    }
}

impl From<&str> for Body<'_> {
    fn from(text: &str) -> Self {
        Body::Raw(text.as_bytes().to_vec())
    }
}

impl From<String> for Body<'_> {
    fn from(text: String) -> Self {
        Body::Raw(text.into_bytes())
    }
}

/// Produce the bytes to send for `body` under `data_type`.
pub fn resolve_body(data_type: &DataType, body: &Body<'_>) -> Result<Vec<u8>, Error> {
    match body {
        Body::Empty => Ok(Vec::new()),
        Body::Structured(encode) => encode(data_type),
        Body::Raw(bytes) => match data_type {
            DataType::Json if is_json(bytes) => {
                tracing::trace!(len = bytes.len(), "raw body is valid json, passing through");
                Ok(bytes.clone())
            }
            DataType::Json => Err(Error::Serialization(
                "raw body declared as json is not a valid json document".to_string(),
            )),
            DataType::Xml if is_xml(bytes) => {
                tracing::trace!(len = bytes.len(), "raw body is valid xml, passing through");
                Ok(bytes.clone())
            }
            DataType::Xml => Err(Error::Serialization(
                "raw body declared as xml is not a well-formed xml document".to_string(),
            )),
            DataType::Raw | DataType::Text | DataType::Unknown(_) => Ok(bytes.clone()),
        },
    }
}

/// Marshal a structured value. Tags without a codec fall back to JSON.
pub fn marshal<T: Serialize + ?Sized>(data_type: &DataType, value: &T) -> Result<Vec<u8>, Error> {
    match data_type {
        DataType::Xml => quick_xml::se::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| Error::Serialization(e.to_string())),
        _ => serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string())),
    }
}

pub fn unmarshal_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
}

pub fn unmarshal_xml<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    quick_xml::de::from_reader(bytes).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Whether `bytes` hold exactly one JSON document of any kind.
pub fn is_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<IgnoredAny>(bytes).is_ok()
}

/// Whether `bytes` hold a well-formed XML document with a single root.
pub fn is_xml(bytes: &[u8]) -> bool {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Ok(Event::End(_)) => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            Ok(Event::Empty(_)) => {
                if depth == 0 {
                    roots += 1;
                }
            }
            Ok(Event::Text(text)) if depth == 0 => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return false;
                }
            }
            Ok(Event::Eof) => return depth == 0 && roots == 1,
            Ok(_) => {}
            Err(_) => return false,
        }
        buf.clear();
    }
}
