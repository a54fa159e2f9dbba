//! Signing algorithms for the 3-segment compact form.

use super::RsaKeys;
use crate::error::{TokenError, TokenResult};
use hmac::{digest::KeyInit, Hmac, Mac};
use rsa::{
    pkcs1v15::{
        Signature as RsaSignature, SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey,
    },
    signature::{SignatureEncoding, Signer as _, Verifier as _},
};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

/// A signing algorithm together with its key material.
///
/// `None` is a first-class variant: it signs to an empty byte sequence and
/// accepts only an empty signature, so "no signature" never becomes a
/// special case in the codec.
#[derive(Clone)]
pub enum Signer {
    /// No signature.
    None,
    /// HMAC-SHA-256 with a shared secret.
    Hs256(Zeroizing<Vec<u8>>),
    /// HMAC-SHA-384 with a shared secret.
    Hs384(Zeroizing<Vec<u8>>),
    /// HMAC-SHA-512 with a shared secret.
    Hs512(Zeroizing<Vec<u8>>),
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    Rs256(RsaKeys),
    /// RSASSA-PKCS1-v1_5 with SHA-384.
    Rs384(RsaKeys),
    /// RSASSA-PKCS1-v1_5 with SHA-512.
    Rs512(RsaKeys),
    /// ECDSA over P-256 with SHA-256.
    Es256 {
        /// Public half, always present.
        verifying: p256::ecdsa::VerifyingKey,
        /// Private half; absent for verify-only parties.
        signing: Option<p256::ecdsa::SigningKey>,
    },
    /// ECDSA over P-384 with SHA-384.
    Es384 {
        /// Public half, always present.
        verifying: p384::ecdsa::VerifyingKey,
        /// Private half; absent for verify-only parties.
        signing: Option<p384::ecdsa::SigningKey>,
    },
    /// ECDSA over P-521 with SHA-512.
    Es512 {
        /// Public half, always present.
        verifying: p521::ecdsa::VerifyingKey,
        /// Private half; absent for verify-only parties.
        signing: Option<p521::ecdsa::SigningKey>,
    },
}

impl Signer {
    /// HMAC-SHA-256 signer.
    #[must_use]
    pub fn hs256(key: impl Into<Vec<u8>>) -> Self {
        Signer::Hs256(Zeroizing::new(key.into()))
    }

    /// HMAC-SHA-384 signer.
    #[must_use]
    pub fn hs384(key: impl Into<Vec<u8>>) -> Self {
        Signer::Hs384(Zeroizing::new(key.into()))
    }

    /// HMAC-SHA-512 signer.
    #[must_use]
    pub fn hs512(key: impl Into<Vec<u8>>) -> Self {
        Signer::Hs512(Zeroizing::new(key.into()))
    }

    /// RS256 signer from a private key.
    #[must_use]
    pub fn rs256(private: rsa::RsaPrivateKey) -> Self {
        Signer::Rs256(RsaKeys::from_private(private))
    }

    /// RS384 signer from a private key.
    #[must_use]
    pub fn rs384(private: rsa::RsaPrivateKey) -> Self {
        Signer::Rs384(RsaKeys::from_private(private))
    }

    /// RS512 signer from a private key.
    #[must_use]
    pub fn rs512(private: rsa::RsaPrivateKey) -> Self {
        Signer::Rs512(RsaKeys::from_private(private))
    }

    /// Verify-only RS256 from a public key.
    #[must_use]
    pub fn rs256_verify(public: rsa::RsaPublicKey) -> Self {
        Signer::Rs256(RsaKeys::from_public(public))
    }

    /// Verify-only RS384 from a public key.
    #[must_use]
    pub fn rs384_verify(public: rsa::RsaPublicKey) -> Self {
        Signer::Rs384(RsaKeys::from_public(public))
    }

    /// Verify-only RS512 from a public key.
    #[must_use]
    pub fn rs512_verify(public: rsa::RsaPublicKey) -> Self {
        Signer::Rs512(RsaKeys::from_public(public))
    }

    /// ES256 signer from a private key.
    #[must_use]
    pub fn es256(signing: p256::ecdsa::SigningKey) -> Self {
        Signer::Es256 {
            verifying: signing.verifying_key().clone(),
            signing: Some(signing),
        }
    }

    /// ES384 signer from a private key.
    #[must_use]
    pub fn es384(signing: p384::ecdsa::SigningKey) -> Self {
        Signer::Es384 {
            verifying: signing.verifying_key().clone(),
            signing: Some(signing),
        }
    }

    /// ES512 signer from a private key.
    #[must_use]
    pub fn es512(signing: p521::ecdsa::SigningKey) -> Self {
        // p521's SigningKey does not expose verifying_key(); derive through From.
        Signer::Es512 {
            verifying: p521::ecdsa::VerifyingKey::from(&signing),
            signing: Some(signing),
        }
    }

    /// Verify-only ES256 from a public key.
    #[must_use]
    pub fn es256_verify(verifying: p256::ecdsa::VerifyingKey) -> Self {
        Signer::Es256 {
            verifying,
            signing: None,
        }
    }

    /// Verify-only ES384 from a public key.
    #[must_use]
    pub fn es384_verify(verifying: p384::ecdsa::VerifyingKey) -> Self {
        Signer::Es384 {
            verifying,
            signing: None,
        }
    }

    /// Verify-only ES512 from a public key.
    #[must_use]
    pub fn es512_verify(verifying: p521::ecdsa::VerifyingKey) -> Self {
        Signer::Es512 {
            verifying,
            signing: None,
        }
    }

    /// Algorithm identifier placed in the header's `alg` field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Signer::None => "none",
            Signer::Hs256(_) => "HS256",
            Signer::Hs384(_) => "HS384",
            Signer::Hs512(_) => "HS512",
            Signer::Rs256(_) => "RS256",
            Signer::Rs384(_) => "RS384",
            Signer::Rs512(_) => "RS512",
            Signer::Es256 { .. } => "ES256",
            Signer::Es384 { .. } => "ES384",
            Signer::Es512 { .. } => "ES512",
        }
    }

    /// Sign the secured input (the first two segments joined by a dot).
    pub fn sign(&self, secured_input: &[u8]) -> TokenResult<Vec<u8>> {
        match self {
            Signer::None => Ok(Vec::new()),
            Signer::Hs256(key) => hmac_sign::<Hmac<Sha256>>(key, secured_input),
            Signer::Hs384(key) => hmac_sign::<Hmac<Sha384>>(key, secured_input),
            Signer::Hs512(key) => hmac_sign::<Hmac<Sha512>>(key, secured_input),
            Signer::Rs256(keys) => {
                let private = rsa_private(keys)?;
                let key = RsaSigningKey::<Sha256>::new(private.clone());
                rsa_try_sign(&key, secured_input)
            }
            Signer::Rs384(keys) => {
                let private = rsa_private(keys)?;
                let key = RsaSigningKey::<Sha384>::new(private.clone());
                rsa_try_sign(&key, secured_input)
            }
            Signer::Rs512(keys) => {
                let private = rsa_private(keys)?;
                let key = RsaSigningKey::<Sha512>::new(private.clone());
                rsa_try_sign(&key, secured_input)
            }
            Signer::Es256 { signing, .. } => {
                let key = ec_private(signing.as_ref())?;
                let signature: p256::ecdsa::Signature = key
                    .try_sign(secured_input)
                    .map_err(|e| TokenError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
            Signer::Es384 { signing, .. } => {
                let key = ec_private(signing.as_ref())?;
                let signature: p384::ecdsa::Signature = key
                    .try_sign(secured_input)
                    .map_err(|e| TokenError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
            Signer::Es512 { signing, .. } => {
                let key = ec_private(signing.as_ref())?;
                let signature: p521::ecdsa::Signature = key
                    .try_sign(secured_input)
                    .map_err(|e| TokenError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }

    /// Verify a signature over the secured input.
    ///
    /// Malformed signatures verify as false rather than erroring; the codec
    /// turns false into a uniform `Invalid signature`.
    #[must_use]
    pub fn is_valid(&self, signature: &[u8], secured_input: &[u8]) -> bool {
        match self {
            Signer::None => signature.is_empty(),
            Signer::Hs256(key) => hmac_verify::<Hmac<Sha256>>(key, signature, secured_input),
            Signer::Hs384(key) => hmac_verify::<Hmac<Sha384>>(key, signature, secured_input),
            Signer::Hs512(key) => hmac_verify::<Hmac<Sha512>>(key, signature, secured_input),
            Signer::Rs256(keys) => {
                let key = RsaVerifyingKey::<Sha256>::new(keys.public.clone());
                RsaSignature::try_from(signature)
                    .map(|sig| key.verify(secured_input, &sig).is_ok())
                    .unwrap_or(false)
            }
            Signer::Rs384(keys) => {
                let key = RsaVerifyingKey::<Sha384>::new(keys.public.clone());
                RsaSignature::try_from(signature)
                    .map(|sig| key.verify(secured_input, &sig).is_ok())
                    .unwrap_or(false)
            }
            Signer::Rs512(keys) => {
                let key = RsaVerifyingKey::<Sha512>::new(keys.public.clone());
                RsaSignature::try_from(signature)
                    .map(|sig| key.verify(secured_input, &sig).is_ok())
                    .unwrap_or(false)
            }
            Signer::Es256 { verifying, .. } => p256::ecdsa::Signature::from_slice(signature)
                .map(|sig| verifying.verify(secured_input, &sig).is_ok())
                .unwrap_or(false),
            Signer::Es384 { verifying, .. } => p384::ecdsa::Signature::from_slice(signature)
                .map(|sig| verifying.verify(secured_input, &sig).is_ok())
                .unwrap_or(false),
            Signer::Es512 { verifying, .. } => p521::ecdsa::Signature::from_slice(signature)
                .map(|sig| verifying.verify(secured_input, &sig).is_ok())
                .unwrap_or(false),
        }
    }
}

fn rsa_private(keys: &RsaKeys) -> TokenResult<&rsa::RsaPrivateKey> {
    keys.private
        .as_ref()
        .ok_or_else(|| TokenError::Signing("signer has no private key".to_string()))
}

fn ec_private<K>(signing: Option<&K>) -> TokenResult<&K> {
    signing.ok_or_else(|| TokenError::Signing("signer has no private key".to_string()))
}

fn rsa_try_sign<D>(key: &RsaSigningKey<D>, input: &[u8]) -> TokenResult<Vec<u8>>
where
    D: sha2::digest::Digest,
    RsaSigningKey<D>: rsa::signature::Signer<RsaSignature>,
{
    let signature = key
        .try_sign(input)
        .map_err(|e| TokenError::Signing(e.to_string()))?;
    Ok(signature.to_vec())
}

fn hmac_sign<M: Mac + KeyInit>(key: &[u8], input: &[u8]) -> TokenResult<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|_| TokenError::Signing("invalid HMAC key".to_string()))?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_verify<M: Mac + KeyInit>(key: &[u8], signature: &[u8], input: &[u8]) -> bool {
    match <M as Mac>::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(input);
            mac.verify_slice(signature).is_ok()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_signs_empty_and_accepts_only_empty() {
        let signer = Signer::None;
        assert!(signer.sign(b"input").unwrap().is_empty());
        assert!(signer.is_valid(b"", b"input"));
        assert!(!signer.is_valid(b"x", b"input"));
    }

    #[test]
    fn hmac_sign_verify_round_trip() {
        let signer = Signer::hs256(b"secret".to_vec());
        let signature = signer.sign(b"header.payload").unwrap();
        assert_eq!(signature.len(), 32);
        assert!(signer.is_valid(&signature, b"header.payload"));
        assert!(!signer.is_valid(&signature, b"header.tampered"));
    }

    #[test]
    fn hmac_rejects_wrong_key() {
        let signer = Signer::hs512(b"key-a".to_vec());
        let other = Signer::hs512(b"key-b".to_vec());
        let signature = signer.sign(b"data").unwrap();
        assert!(!other.is_valid(&signature, b"data"));
    }

    #[test]
    fn ecdsa_signature_is_fixed_size() {
        let key = p256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        let signer = Signer::es256(key);
        let signature = signer.sign(b"data").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signer.is_valid(&signature, b"data"));
    }

    #[test]
    fn es512_derives_its_verifying_key_from_the_private_half() {
        let key = p521::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        let signer = Signer::es512(key);
        let signature = signer.sign(b"data").unwrap();
        assert_eq!(signature.len(), 132); // fixed-size r || s for P-521
        assert!(signer.is_valid(&signature, b"data"));
        assert!(!signer.is_valid(&signature, b"tampered"));
    }

    #[test]
    fn verify_only_signer_cannot_sign() {
        let key = p256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        let signer = Signer::es256_verify(*key.verifying_key());
        assert!(matches!(
            signer.sign(b"data"),
            Err(TokenError::Signing(_))
        ));
    }
}
