//! Caller id decoding.
//!
//! The identity layer usually issues caller ids as standard base64. Some
//! deployments pass them through raw. Decoding is best-effort and never
//! fails: whatever cannot be decoded is used as given.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Outcome of decoding a caller id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerResolution {
    /// The id was base64 of valid UTF-8; holds the decoded text.
    Decoded(String),
    /// The id was not decodable; holds it unchanged.
    Raw(String),
}

impl CallerResolution {
    /// The id to look up in the participant directory.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Decoded(v) | Self::Raw(v) => v,
        }
    }

    /// Whether decoding succeeded.
    #[must_use]
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }
}

/// Decode `caller_id` from standard base64 to UTF-8, falling back to the
/// raw value.
#[must_use]
pub fn resolve_caller(caller_id: &str) -> CallerResolution {
    match STANDARD.decode(caller_id) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => CallerResolution::Decoded(text),
            Err(_) => CallerResolution::Raw(caller_id.to_owned()),
        },
        Err(_) => CallerResolution::Raw(caller_id.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_base64() {
        let encoded = STANDARD.encode("alice");
        assert_eq!(
            resolve_caller(&encoded),
            CallerResolution::Decoded("alice".into())
        );
    }

    #[test]
    fn test_raw_when_not_base64() {
        let r = resolve_caller("not base64!");
        assert_eq!(r, CallerResolution::Raw("not base64!".into()));
        assert!(!r.is_decoded());
    }

    #[test]
    fn test_raw_when_not_utf8() {
        let encoded = STANDARD.encode([0xff_u8, 0xfe, 0xfd]);
        let r = resolve_caller(&encoded);
        assert_eq!(r.value(), encoded);
    }

    #[test]
    fn test_plain_ids_that_happen_to_decode() {
        // "abcd" is valid base64 but decodes to non-UTF-8 bytes.
        assert_eq!(resolve_caller("abcd").value(), "abcd");
    }
}
