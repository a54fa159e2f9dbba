//! Unpadded URL-safe base64 used for every token segment.

use crate::error::EncodingError;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Encode bytes with the URL-safe alphabet, no padding.
#[must_use]
pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode an unpadded URL-safe base64 string.
pub fn decode(input: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(URL_SAFE_NO_PAD.decode(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let data = [0u8, 1, 2, 0xfb, 0xff, 0x7e];
        assert_eq!(decode(&encode(data)).unwrap(), data);
    }

    #[test]
    fn emits_no_padding() {
        assert_eq!(encode(b"a"), "YQ");
        assert_eq!(encode(b"ab"), "YWI");
        assert!(!encode(b"abc").contains('='));
    }

    #[test]
    fn uses_url_safe_alphabet() {
        // 0xfb 0xff encodes to characters outside the standard alphabet
        let encoded = encode([0xfbu8, 0xff]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }

    #[test]
    fn rejects_invalid_alphabet() {
        assert!(decode("a+b/c").is_err());
        assert!(decode("not base64!").is_err());
    }

    #[test]
    fn decode_failures_carry_the_base64_cause() {
        let err = decode("not base64!").unwrap_err();
        assert!(err.to_string().starts_with("Invalid base64url:"));
    }

    #[test]
    fn empty_input_decodes_to_empty() {
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }
}
