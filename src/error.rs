//! Error types for token encoding, decoding, and claims validation.

use thiserror::Error;

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Error raised by the base64url decode boundary: input contains
/// characters outside the unpadded URL-safe alphabet.
#[derive(Debug, Error)]
#[error("Invalid base64url: {0}")]
pub struct EncodingError(#[from] base64::DecodeError);

/// A well-formed, authenticated token whose claims fail policy.
///
/// Distinct from [`TokenError`] so callers can separate "forged or
/// malformed" from "valid token we choose not to accept".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// `exp` is in the past (beyond the configured clock skew)
    #[error("Token has expired")]
    Expired,

    /// `nbf` is in the future (beyond the configured clock skew)
    #[error("Token not yet valid")]
    NotYetValid,

    /// `iss` is not among the configured valid issuers
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// `aud` does not intersect the configured valid audiences
    #[error("Invalid audience")]
    InvalidAudience,

    /// A validated claim has the wrong JSON type
    #[error("Malformed claim: {0}")]
    Malformed(&'static str),
}

/// Structural or cryptographic rejection of a token.
///
/// Cryptographic failures are collapsed to a uniform `InvalidToken` at the
/// algorithm boundary. The collapsing is deliberate: distinguishing a bad
/// tag from a bad padding from a bad key hands an attacker an oracle.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Wrong number of dot-delimited segments
    #[error("Invalid token format")]
    InvalidFormat,

    /// A segment failed base64url decoding or the header failed JSON parsing
    #[error("Invalid token encoding")]
    InvalidEncoding,

    /// Signature verification failed
    #[error("Invalid signature")]
    InvalidSignature,

    /// Uniform cryptographic rejection (bad tag, MAC, padding, or key)
    #[error("Invalid token")]
    InvalidToken,

    /// The resolution callback yielded no decrypter for the token
    #[error("No decrypter resolved for token")]
    MissingDecrypter,

    /// Signing-side failure (missing private key, invalid key material)
    #[error("Signing error: {0}")]
    Signing(String),

    /// Encryption-side failure (key size mismatch, cipher setup)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Header or payload could not be serialized to JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Claims failed policy validation
    #[error(transparent)]
    Claim(#[from] ClaimError),
}

impl TokenError {
    /// True when the failure is a claims-policy rejection rather than a
    /// structural or cryptographic one.
    #[must_use]
    pub fn is_claim_error(&self) -> bool {
        matches!(self, TokenError::Claim(_))
    }
}
