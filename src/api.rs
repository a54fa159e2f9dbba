//! Top-level entry points: encode, decode, encrypt, decrypt.

use crate::{
    algorithms::{ContentEncrypter, Signer},
    claims, compact,
    error::{TokenError, TokenResult},
    header::Header,
    options::{Options, OptionsOverride},
};
use serde_json::Value;

/// Decoded payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON payload (content type unspecified or JSON). Object payloads
    /// have passed claims validation.
    Json(Value),
    /// Opaque payload bytes, returned unparsed and unvalidated when the
    /// header marks a non-JSON content type such as a nested `"JWT"`.
    Raw(Vec<u8>),
}

impl Payload {
    /// The parsed JSON value, if the payload was treated as JSON.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Raw(_) => None,
        }
    }

    /// The raw bytes, if the payload was passed through opaquely.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Raw(bytes) => Some(bytes),
            Payload::Json(_) => None,
        }
    }
}

/// Result of a successful decode or decrypt.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The parsed, verified header.
    pub header: Header,
    /// The validated payload.
    pub payload: Payload,
}

/// Sign `payload` into the 3-segment compact form.
///
/// The header's `alg` field is set from the signer; a caller-supplied value
/// is overwritten.
pub fn encode(header: &Header, payload: &[u8], signer: &Signer) -> TokenResult<String> {
    let mut header = header.clone();
    header.alg = Some(signer.name().to_string());
    compact::encode_signed(&header, payload, signer)
}

/// Serialize a JSON claims value and sign it.
pub fn encode_json(header: &Header, payload: &Value, signer: &Signer) -> TokenResult<String> {
    let bytes =
        serde_json::to_vec(payload).map_err(|e| TokenError::Serialization(e.to_string()))?;
    encode(header, &bytes, signer)
}

/// Verify and decode a signed token.
///
/// The resolver sees the decoded header and the effective options before
/// any payload is consumed; returning `None` falls back to the `none`
/// signer, which only accepts an empty signature. Matching `kid` to a key
/// is the caller's trust decision, not the codec's.
pub fn decode<'a, F>(
    token: &str,
    resolver: F,
    overrides: &OptionsOverride,
) -> TokenResult<Decoded>
where
    F: FnOnce(&Header, &Options) -> Option<&'a Signer>,
{
    let parts = compact::split_signed(token)?;
    let options = Options::effective(overrides);

    let fallback = Signer::None;
    let signer = resolver(&parts.header, &options).unwrap_or(&fallback);

    if !options.ignore_signature {
        let secured_input = parts.secured_input();
        if !signer.is_valid(&parts.signature, secured_input.as_bytes()) {
            tracing::debug!(alg = signer.name(), "signature verification failed");
            return Err(TokenError::InvalidSignature);
        }
    }

    finish(parts.header, parts.payload, &options)
}

/// Encrypt `payload` into the 5-segment compact form.
///
/// The header's `alg` and `enc` fields are set from the encrypter;
/// caller-supplied values are overwritten.
pub fn encrypt(
    header: &Header,
    payload: &[u8],
    encrypter: &ContentEncrypter,
) -> TokenResult<String> {
    let mut header = header.clone();
    header.alg = Some(encrypter.alg().name().to_string());
    header.enc = Some(encrypter.name().to_string());
    encrypter.encrypt(&header, payload)
}

/// Decrypt and validate an encrypted token.
///
/// Unlike [`decode`], there is no safe default algorithm: a resolver that
/// yields nothing is a hard failure.
pub fn decrypt<'a, F>(
    token: &str,
    resolver: F,
    overrides: &OptionsOverride,
) -> TokenResult<Decoded>
where
    F: FnOnce(&Header, &Options) -> Option<&'a ContentEncrypter>,
{
    let parts = compact::split_encrypted(token)?;
    let options = Options::effective(overrides);

    let Some(encrypter) = resolver(&parts.header, &options) else {
        tracing::debug!("resolution callback yielded no decrypter");
        return Err(TokenError::MissingDecrypter);
    };

    let payload = encrypter.decrypt(&parts)?;
    finish(parts.header, payload, &options)
}

/// Content-type dispatch and claims validation shared by both decode paths.
fn finish(header: Header, payload: Vec<u8>, options: &Options) -> TokenResult<Decoded> {
    if !header.payload_is_json() {
        return Ok(Decoded {
            header,
            payload: Payload::Raw(payload),
        });
    }

    let value: Value =
        serde_json::from_slice(&payload).map_err(|_| TokenError::InvalidEncoding)?;
    if let Some(object) = value.as_object() {
        claims::validate(object, options)?;
    }

    Ok(Decoded {
        header,
        payload: Payload::Json(value),
    })
}
