//! Content-encryption algorithms and the authenticated-token construction.
//!
//! The encrypter owns the whole 5-segment construction: it draws the content
//! master key and IV, wraps the key through its [`KeyEncrypter`], and
//! authenticates the first three segments exactly as they appear on the
//! wire. Decryption rebuilds the authenticated data from the raw segments,
//! so it matches byte-for-byte regardless of how the header JSON would
//! re-serialize.

use super::KeyEncrypter;
use crate::{
    compact::EncryptedParts,
    encoding,
    error::{TokenError, TokenResult},
    header::Header,
};
use aes::{Aes128, Aes256};
use aes_gcm::{
    aead::{generic_array::typenum::Unsigned, generic_array::GenericArray, AeadInPlace},
    Aes128Gcm, Aes256Gcm, KeyInit,
};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// A content-encryption algorithm bound to its key-management algorithm.
#[derive(Clone)]
pub enum ContentEncrypter {
    /// AES-128-CBC with an HMAC-SHA-256 tag. 32-byte CMK, split in half.
    A128CbcHs256(KeyEncrypter),
    /// AES-256-CBC with an HMAC-SHA-512 tag. 64-byte CMK, split in half.
    A256CbcHs512(KeyEncrypter),
    /// AES-128-GCM. 16-byte CMK.
    A128Gcm(KeyEncrypter),
    /// AES-256-GCM. 32-byte CMK.
    A256Gcm(KeyEncrypter),
}

impl ContentEncrypter {
    /// Algorithm identifier placed in the header's `enc` field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ContentEncrypter::A128CbcHs256(_) => "A128CBC-HS256",
            ContentEncrypter::A256CbcHs512(_) => "A256CBC-HS512",
            ContentEncrypter::A128Gcm(_) => "A128GCM",
            ContentEncrypter::A256Gcm(_) => "A256GCM",
        }
    }

    /// The associated key-management algorithm.
    #[must_use]
    pub fn alg(&self) -> &KeyEncrypter {
        match self {
            ContentEncrypter::A128CbcHs256(alg)
            | ContentEncrypter::A256CbcHs512(alg)
            | ContentEncrypter::A128Gcm(alg)
            | ContentEncrypter::A256Gcm(alg) => alg,
        }
    }

    /// Content master key size in bytes.
    #[must_use]
    pub fn key_len(&self) -> usize {
        match self {
            ContentEncrypter::A128CbcHs256(_) => 32,
            ContentEncrypter::A256CbcHs512(_) => 64,
            ContentEncrypter::A128Gcm(_) => 16,
            ContentEncrypter::A256Gcm(_) => 32,
        }
    }

    /// Initialization vector size in bytes.
    #[must_use]
    pub fn iv_len(&self) -> usize {
        match self {
            ContentEncrypter::A128CbcHs256(_) | ContentEncrypter::A256CbcHs512(_) => 16,
            ContentEncrypter::A128Gcm(_) | ContentEncrypter::A256Gcm(_) => 12,
        }
    }

    /// Produce the serialized 5-segment encrypted form.
    ///
    /// The header is serialized exactly once; that byte string is both the
    /// first segment and the start of the authenticated data.
    pub fn encrypt(&self, header: &Header, payload: &[u8]) -> TokenResult<String> {
        let header_json = serde_json::to_vec(header)
            .map_err(|e| TokenError::Serialization(e.to_string()))?;

        let cmk = match self.alg().preset_cmk() {
            Some(key) => {
                if key.len() != self.key_len() {
                    return Err(TokenError::Encryption(format!(
                        "{} requires a {}-byte key, got {}",
                        self.name(),
                        self.key_len(),
                        key.len()
                    )));
                }
                Zeroizing::new(key.to_vec())
            }
            None => {
                let mut key = Zeroizing::new(vec![0u8; self.key_len()]);
                rand::rng().fill_bytes(&mut key);
                key
            }
        };

        let encrypted_key = self.alg().encrypt_key(&cmk)?;

        let mut iv = vec![0u8; self.iv_len()];
        rand::rng().fill_bytes(&mut iv);

        // The cipher authenticates exactly this byte string.
        let mut token = encoding::encode(&header_json);
        token.push('.');
        token.push_str(&encoding::encode(&encrypted_key));
        token.push('.');
        token.push_str(&encoding::encode(&iv));

        let (ciphertext, tag) = self.seal(&cmk, &iv, token.as_bytes(), payload)?;

        token.push('.');
        token.push_str(&encoding::encode(&ciphertext));
        token.push('.');
        token.push_str(&encoding::encode(&tag));
        Ok(token)
    }

    /// Recover the payload from split token parts.
    ///
    /// Every cipher-level failure (bad tag, bad MAC, bad padding, wrong or
    /// wrongly-sized key) is reported as the same `Invalid token`.
    pub fn decrypt(&self, parts: &EncryptedParts<'_>) -> TokenResult<Vec<u8>> {
        let cmk = self.alg().decrypt_key(&parts.encrypted_key)?;
        if cmk.len() != self.key_len() {
            return Err(TokenError::InvalidToken);
        }
        let auth_data = parts.authenticated_data();
        self.open(
            &cmk,
            &parts.iv,
            auth_data.as_bytes(),
            &parts.ciphertext,
            &parts.tag,
        )
    }

    fn seal(
        &self,
        cmk: &[u8],
        iv: &[u8],
        auth_data: &[u8],
        payload: &[u8],
    ) -> TokenResult<(Vec<u8>, Vec<u8>)> {
        match self {
            ContentEncrypter::A128Gcm(_) => gcm_seal::<Aes128Gcm>(cmk, iv, auth_data, payload),
            ContentEncrypter::A256Gcm(_) => gcm_seal::<Aes256Gcm>(cmk, iv, auth_data, payload),
            ContentEncrypter::A128CbcHs256(_) => {
                let (mac_key, enc_key) = cmk.split_at(16);
                let ciphertext = Aes128CbcEnc::new_from_slices(enc_key, iv)
                    .map_err(|e| TokenError::Encryption(e.to_string()))?
                    .encrypt_padded_vec_mut::<Pkcs7>(payload);
                let tag = cbc_tag::<Hmac<Sha256>>(mac_key, auth_data, &ciphertext)?;
                Ok((ciphertext, tag))
            }
            ContentEncrypter::A256CbcHs512(_) => {
                let (mac_key, enc_key) = cmk.split_at(32);
                let ciphertext = Aes256CbcEnc::new_from_slices(enc_key, iv)
                    .map_err(|e| TokenError::Encryption(e.to_string()))?
                    .encrypt_padded_vec_mut::<Pkcs7>(payload);
                let tag = cbc_tag::<Hmac<Sha512>>(mac_key, auth_data, &ciphertext)?;
                Ok((ciphertext, tag))
            }
        }
    }

    fn open(
        &self,
        cmk: &[u8],
        iv: &[u8],
        auth_data: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> TokenResult<Vec<u8>> {
        match self {
            ContentEncrypter::A128Gcm(_) => {
                gcm_open::<Aes128Gcm>(cmk, iv, auth_data, ciphertext, tag)
            }
            ContentEncrypter::A256Gcm(_) => {
                gcm_open::<Aes256Gcm>(cmk, iv, auth_data, ciphertext, tag)
            }
            ContentEncrypter::A128CbcHs256(_) => {
                let (mac_key, enc_key) = cmk.split_at(16);
                cbc_verify::<Hmac<Sha256>>(mac_key, auth_data, ciphertext, tag)?;
                Aes128CbcDec::new_from_slices(enc_key, iv)
                    .map_err(|_| TokenError::InvalidToken)?
                    .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                    .map_err(|_| TokenError::InvalidToken)
            }
            ContentEncrypter::A256CbcHs512(_) => {
                let (mac_key, enc_key) = cmk.split_at(32);
                cbc_verify::<Hmac<Sha512>>(mac_key, auth_data, ciphertext, tag)?;
                Aes256CbcDec::new_from_slices(enc_key, iv)
                    .map_err(|_| TokenError::InvalidToken)?
                    .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                    .map_err(|_| TokenError::InvalidToken)
            }
        }
    }
}

impl std::fmt::Debug for ContentEncrypter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(self.name()).finish()
    }
}

fn gcm_seal<C>(
    key: &[u8],
    iv: &[u8],
    auth_data: &[u8],
    payload: &[u8],
) -> TokenResult<(Vec<u8>, Vec<u8>)>
where
    C: AeadInPlace + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|e| TokenError::Encryption(e.to_string()))?;
    let mut buffer = payload.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv), auth_data, &mut buffer)
        .map_err(|_| TokenError::Encryption("AEAD encryption failed".to_string()))?;
    Ok((buffer, tag.to_vec()))
}

fn gcm_open<C>(
    key: &[u8],
    iv: &[u8],
    auth_data: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> TokenResult<Vec<u8>>
where
    C: AeadInPlace + KeyInit,
{
    if iv.len() != C::NonceSize::USIZE || tag.len() != C::TagSize::USIZE {
        return Err(TokenError::InvalidToken);
    }
    let cipher = C::new_from_slice(key).map_err(|_| TokenError::InvalidToken)?;
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(iv),
            auth_data,
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| TokenError::InvalidToken)?;
    Ok(buffer)
}

/// MAC over the authenticated data followed by the ciphertext.
fn cbc_tag<M: Mac + hmac::digest::KeyInit>(
    key: &[u8],
    auth_data: &[u8],
    ciphertext: &[u8],
) -> TokenResult<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|_| TokenError::Encryption("invalid MAC key".to_string()))?;
    mac.update(auth_data);
    mac.update(ciphertext);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time MAC check before any decryption is attempted.
fn cbc_verify<M: Mac + hmac::digest::KeyInit>(
    key: &[u8],
    auth_data: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> TokenResult<()> {
    let mut mac =
        <M as Mac>::new_from_slice(key).map_err(|_| TokenError::InvalidToken)?;
    mac.update(auth_data);
    mac.update(ciphertext);
    mac.verify_slice(tag).map_err(|_| TokenError::InvalidToken)
}
