//! Key-management algorithms: protecting the content master key.

use super::RsaKeys;
use crate::error::{TokenError, TokenResult};
use rand_core::OsRng;
use rsa::{Oaep, Pkcs1v15Encrypt};
use sha1::Sha1;
use zeroize::Zeroizing;

/// A key-encryption algorithm together with its key material.
#[derive(Clone)]
pub enum KeyEncrypter {
    /// Direct use of a pre-shared symmetric key. The encrypted-key segment
    /// is empty on the wire.
    Dir(Zeroizing<Vec<u8>>),
    /// RSAES-PKCS1-v1_5 key wrapping.
    Rsa1_5(RsaKeys),
    /// RSAES-OAEP key wrapping (SHA-1 / MGF1-SHA-1).
    RsaOaep(RsaKeys),
}

impl KeyEncrypter {
    /// Direct key agreement with a pre-shared symmetric key.
    #[must_use]
    pub fn dir(key: impl Into<Vec<u8>>) -> Self {
        KeyEncrypter::Dir(Zeroizing::new(key.into()))
    }

    /// RSA1_5 wrapping from a private key (can both wrap and unwrap).
    #[must_use]
    pub fn rsa1_5(private: rsa::RsaPrivateKey) -> Self {
        KeyEncrypter::Rsa1_5(RsaKeys::from_private(private))
    }

    /// Wrap-only RSA1_5 from a public key.
    #[must_use]
    pub fn rsa1_5_public(public: rsa::RsaPublicKey) -> Self {
        KeyEncrypter::Rsa1_5(RsaKeys::from_public(public))
    }

    /// RSA-OAEP wrapping from a private key (can both wrap and unwrap).
    #[must_use]
    pub fn rsa_oaep(private: rsa::RsaPrivateKey) -> Self {
        KeyEncrypter::RsaOaep(RsaKeys::from_private(private))
    }

    /// Wrap-only RSA-OAEP from a public key.
    #[must_use]
    pub fn rsa_oaep_public(public: rsa::RsaPublicKey) -> Self {
        KeyEncrypter::RsaOaep(RsaKeys::from_public(public))
    }

    /// Algorithm identifier placed in the header's `alg` field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            KeyEncrypter::Dir(_) => "dir",
            KeyEncrypter::Rsa1_5(_) => "RSA1_5",
            KeyEncrypter::RsaOaep(_) => "RSA-OAEP",
        }
    }

    /// The pre-shared CMK, for algorithms that fix it at construction.
    #[must_use]
    pub fn preset_cmk(&self) -> Option<&[u8]> {
        match self {
            KeyEncrypter::Dir(key) => Some(key),
            _ => None,
        }
    }

    /// Wrap the content master key. `dir` contributes an empty segment.
    pub fn encrypt_key(&self, cmk: &[u8]) -> TokenResult<Vec<u8>> {
        match self {
            KeyEncrypter::Dir(_) => Ok(Vec::new()),
            KeyEncrypter::Rsa1_5(keys) => keys
                .public
                .encrypt(&mut OsRng, Pkcs1v15Encrypt, cmk)
                .map_err(|e| TokenError::Encryption(e.to_string())),
            KeyEncrypter::RsaOaep(keys) => keys
                .public
                .encrypt(&mut OsRng, Oaep::new::<Sha1>(), cmk)
                .map_err(|e| TokenError::Encryption(e.to_string())),
        }
    }

    /// Unwrap the content master key from the encrypted-key segment.
    ///
    /// Every failure, including a wrong key or malformed padding, is
    /// reported as the same `Invalid token`. Distinguishing the causes would
    /// hand a padding-oracle to the sender.
    pub fn decrypt_key(&self, encrypted: &[u8]) -> TokenResult<Zeroizing<Vec<u8>>> {
        match self {
            KeyEncrypter::Dir(key) => Ok(key.clone()),
            KeyEncrypter::Rsa1_5(keys) => {
                let private = keys.private.as_ref().ok_or(TokenError::InvalidToken)?;
                private
                    .decrypt(Pkcs1v15Encrypt, encrypted)
                    .map(Zeroizing::new)
                    .map_err(|_| TokenError::InvalidToken)
            }
            KeyEncrypter::RsaOaep(keys) => {
                let private = keys.private.as_ref().ok_or(TokenError::InvalidToken)?;
                private
                    .decrypt(Oaep::new::<Sha1>(), encrypted)
                    .map(Zeroizing::new)
                    .map_err(|_| TokenError::InvalidToken)
            }
        }
    }
}
