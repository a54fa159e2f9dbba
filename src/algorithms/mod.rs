//! Algorithm families: signing, key encryption, and content encryption.
//!
//! Each family is a closed enum. Adding an algorithm means adding a variant,
//! not registering into an open table, so the codec dispatches over a fixed
//! set and exhaustiveness is checked at compile time.

mod content_encrypter;
mod key_encrypter;
mod signer;

pub use content_encrypter::ContentEncrypter;
pub use key_encrypter::KeyEncrypter;
pub use signer::Signer;

use rsa::{RsaPrivateKey, RsaPublicKey};

/// RSA key material shared by the signing and key-encryption variants.
///
/// The private half is optional: verify-only and encrypt-only parties hold
/// just the public key.
#[derive(Clone)]
pub struct RsaKeys {
    pub(crate) public: RsaPublicKey,
    pub(crate) private: Option<RsaPrivateKey>,
}

impl RsaKeys {
    /// Build from a private key; the public half is derived.
    #[must_use]
    pub fn from_private(private: RsaPrivateKey) -> Self {
        Self {
            public: RsaPublicKey::from(&private),
            private: Some(private),
        }
    }

    /// Build from a public key only.
    #[must_use]
    pub fn from_public(public: RsaPublicKey) -> Self {
        Self {
            public,
            private: None,
        }
    }
}

impl std::fmt::Debug for RsaKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeys")
            .field("has_private", &self.private.is_some())
            .finish_non_exhaustive()
    }
}
