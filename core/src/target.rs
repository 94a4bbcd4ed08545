//! Caller-supplied decode targets.
//!
//! # Design
//! A decode target is any `&mut T` where `T: DeserializeOwned + 'static`.
//! The trait is object-safe so a `Request` can hold one without being generic
//! over the target type. Text decoding is only possible into `String` and
//! `Vec<u8>`; every other type reports no text slot.

use std::any::{type_name, Any};

use serde::de::DeserializeOwned;

use crate::codec;
use crate::error::Error;

/// Textual storage a text response is written into.
#[derive(Debug)]
pub enum TextSlot<'a> {
    /// UTF-8 text; non-UTF-8 bodies are rejected.
    Utf8(&'a mut String),
    /// The exact body bytes.
    Bytes(&'a mut Vec<u8>),
}

/// A value a response body can be decoded into.
///
/// For text response types a `String` target only accepts UTF-8 bodies and
/// fails with `Error::Deserialization` otherwise. Use a `Vec<u8>` target when
/// the body may not be UTF-8; it receives the bytes unchanged.
pub trait DecodeTarget {
    fn decode_json(&mut self, body: &[u8]) -> Result<(), Error>;

    fn decode_xml(&mut self, body: &[u8]) -> Result<(), Error>;

    fn text_slot(&mut self) -> Option<TextSlot<'_>>;

    /// Type name used in error messages.
    fn target_type(&self) -> &'static str;
}

impl<T> DecodeTarget for T
where
    T: DeserializeOwned + 'static,
{
    fn decode_json(&mut self, body: &[u8]) -> Result<(), Error> {
        *self = codec::unmarshal_json(body)?;
        Ok(())
    }

    fn decode_xml(&mut self, body: &[u8]) -> Result<(), Error> {
        *self = codec::unmarshal_xml(body)?;
        Ok(())
    }

    fn text_slot(&mut self) -> Option<TextSlot<'_>> {
        let any = self as &mut dyn Any;
        if any.is::<String>() {
            return any.downcast_mut::<String>().map(TextSlot::Utf8);
        }
        any.downcast_mut::<Vec<u8>>().map(TextSlot::Bytes)
    }

    fn target_type(&self) -> &'static str {
        type_name::<T>()
    }
}

impl TextSlot<'_> {
    /// Store `body`, replacing the previous contents.
    pub fn fill(self, body: Vec<u8>) -> Result<(), Error> {
        match self {
            TextSlot::Utf8(text) => {
                *text = String::from_utf8(body)
                    .map_err(|e| Error::Deserialization(format!("body is not valid utf-8: {e}")))?;
            }
            TextSlot::Bytes(bytes) => *bytes = body,
        }
        Ok(())
    }
}
