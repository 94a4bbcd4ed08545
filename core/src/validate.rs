//! Preconditions checked before dispatch and before a text decode.

use crate::error::Error;
use crate::request::Request;
use crate::target::{DecodeTarget, TextSlot};

/// A request needs a non-empty URL; nothing else is checked here.
pub fn validate_request(request: &Request<'_>) -> Result<(), Error> {
    if request.url.trim().is_empty() {
        return Err(Error::MissingUrl);
    }
    Ok(())
}

/// Resolve the textual slot of a decode target, or fail with
/// `NonStringTarget` naming the target's type.
pub fn validate_text_target(target: &mut dyn DecodeTarget) -> Result<TextSlot<'_>, Error> {
    let found = target.target_type();
    target.text_slot().ok_or(Error::NonStringTarget { found })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_is_rejected() {
        let request = Request::new("GET", "");
        assert!(matches!(validate_request(&request), Err(Error::MissingUrl)));
        let request = Request::new("GET", "   ");
        assert!(matches!(validate_request(&request), Err(Error::MissingUrl)));
    }

    #[test]
    fn any_non_empty_url_passes() {
        let request = Request::new("", "http://example.test");
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn non_string_target_names_its_type() {
        let mut number = 0i32;
        let err = validate_text_target(&mut number).unwrap_err();
        assert!(matches!(err, Error::NonStringTarget { found: "i32" }));
    }

    #[test]
    fn string_target_is_accepted() {
        let mut text = String::new();
        assert!(validate_text_target(&mut text).is_ok());
    }
}
