//! Compact serialization: building and splitting the dot-joined segment
//! sequences for the 3-segment signed form and the 5-segment encrypted form.

use crate::{
    algorithms::Signer,
    encoding,
    error::{TokenError, TokenResult},
    header::Header,
};

/// Decoded segments of a signed token, alongside the raw encoded fields.
#[derive(Debug)]
pub struct SignedParts<'a> {
    /// Raw header segment, still base64url-encoded.
    pub raw_header: &'a str,
    /// Raw payload segment, still base64url-encoded.
    pub raw_payload: &'a str,
    /// Parsed header.
    pub header: Header,
    /// Decoded payload bytes.
    pub payload: Vec<u8>,
    /// Decoded signature bytes. Empty for the `none` algorithm.
    pub signature: Vec<u8>,
}

impl SignedParts<'_> {
    /// The byte string the signature was computed over.
    #[must_use]
    pub fn secured_input(&self) -> String {
        format!("{}.{}", self.raw_header, self.raw_payload)
    }
}

/// Decoded segments of an encrypted token, alongside the raw encoded fields.
#[derive(Debug)]
pub struct EncryptedParts<'a> {
    /// The five raw segments in wire order.
    pub raw: [&'a str; 5],
    /// Parsed header.
    pub header: Header,
    /// Decoded encrypted-key segment. Empty for `dir`.
    pub encrypted_key: Vec<u8>,
    /// Decoded initialization vector.
    pub iv: Vec<u8>,
    /// Decoded ciphertext.
    pub ciphertext: Vec<u8>,
    /// Decoded authentication tag.
    pub tag: Vec<u8>,
}

impl EncryptedParts<'_> {
    /// The authenticated data: the first three segments exactly as they
    /// appeared on the wire. Must match byte-for-byte what the encrypter
    /// authenticated.
    #[must_use]
    pub fn authenticated_data(&self) -> String {
        format!("{}.{}.{}", self.raw[0], self.raw[1], self.raw[2])
    }
}

/// Serialize and sign a token in the 3-segment compact form.
pub fn encode_signed(header: &Header, payload: &[u8], signer: &Signer) -> TokenResult<String> {
    let header_json =
        serde_json::to_vec(header).map_err(|e| TokenError::Serialization(e.to_string()))?;

    let mut token = encoding::encode(header_json);
    token.push('.');
    token.push_str(&encoding::encode(payload));

    let signature = signer.sign(token.as_bytes())?;
    token.push('.');
    token.push_str(&encoding::encode(signature));
    Ok(token)
}

/// Split and decode the 3-segment signed form.
///
/// A 2-segment input is normalized to 3 with an empty signature, which is
/// how `none`-signed tokens from encoders that drop the trailing dot arrive.
pub fn split_signed(token: &str) -> TokenResult<SignedParts<'_>> {
    let segments: Vec<&str> = token.split('.').collect();
    let (raw_header, raw_payload, raw_signature) = match segments.as_slice() {
        [h, p] => (*h, *p, ""),
        [h, p, s] => (*h, *p, *s),
        _ => return Err(TokenError::InvalidFormat),
    };

    let header_bytes = encoding::decode(raw_header).map_err(|_| TokenError::InvalidEncoding)?;
    let header: Header =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::InvalidEncoding)?;
    let payload = encoding::decode(raw_payload).map_err(|_| TokenError::InvalidEncoding)?;
    let signature = encoding::decode(raw_signature).map_err(|_| TokenError::InvalidEncoding)?;

    Ok(SignedParts {
        raw_header,
        raw_payload,
        header,
        payload,
        signature,
    })
}

/// Split and decode the 5-segment encrypted form.
pub fn split_encrypted(token: &str) -> TokenResult<EncryptedParts<'_>> {
    let segments: Vec<&str> = token.split('.').collect();
    let raw: [&str; 5] = segments
        .try_into()
        .map_err(|_| TokenError::InvalidFormat)?;

    let header_bytes = encoding::decode(raw[0]).map_err(|_| TokenError::InvalidEncoding)?;
    let header: Header =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::InvalidEncoding)?;
    let encrypted_key = encoding::decode(raw[1]).map_err(|_| TokenError::InvalidEncoding)?;
    let iv = encoding::decode(raw[2]).map_err(|_| TokenError::InvalidEncoding)?;
    let ciphertext = encoding::decode(raw[3]).map_err(|_| TokenError::InvalidEncoding)?;
    let tag = encoding::decode(raw[4]).map_err(|_| TokenError::InvalidEncoding)?;

    Ok(EncryptedParts {
        raw,
        header,
        encrypted_key,
        iv,
        ciphertext,
        tag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;

    #[test]
    fn two_segment_token_gets_an_empty_signature() {
        let header = encoding::encode(br#"{"alg":"none"}"#);
        let payload = encoding::encode(b"data");
        let token = format!("{header}.{payload}");
        let parts = split_signed(&token).unwrap();
        assert!(parts.signature.is_empty());
        assert_eq!(parts.payload, b"data");
    }

    #[test]
    fn four_segments_fail_as_either_form() {
        let seg = encoding::encode(br#"{"alg":"none"}"#);
        let token = format!("{seg}.{seg}.{seg}.{seg}");
        assert!(matches!(
            split_signed(&token),
            Err(TokenError::InvalidFormat)
        ));
        assert!(matches!(
            split_encrypted(&token),
            Err(TokenError::InvalidFormat)
        ));
    }

    #[test]
    fn bad_base64_collapses_to_invalid_encoding() {
        let token = "!!!.payload.sig";
        assert!(matches!(
            split_signed(token),
            Err(TokenError::InvalidEncoding)
        ));
    }

    #[test]
    fn non_json_header_collapses_to_invalid_encoding() {
        let header = encoding::encode(b"not json");
        let payload = encoding::encode(b"data");
        let token = format!("{header}.{payload}.");
        assert!(matches!(
            split_signed(&token),
            Err(TokenError::InvalidEncoding)
        ));
    }

    #[test]
    fn authenticated_data_is_the_raw_first_three_segments() {
        let seg: Vec<String> = (0..5).map(|i| encoding::encode([i as u8])).collect();
        let header = encoding::encode(br#"{"alg":"dir","enc":"A128GCM"}"#);
        let token = format!("{header}.{}.{}.{}.{}", seg[1], seg[2], seg[3], seg[4]);
        let parts = split_encrypted(&token).unwrap();
        assert_eq!(
            parts.authenticated_data(),
            format!("{header}.{}.{}", seg[1], seg[2])
        );
    }
}
