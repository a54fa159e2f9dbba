//! Signed and encrypted compact security tokens.
//!
//! Tokens are dot-joined sequences of unpadded base64url segments carrying
//! a JSON header, a payload, and cryptographic protection values. The
//! signed form has 3 segments, the encrypted form 5. Algorithms come in
//! three swappable families: [`Signer`] for signatures, [`KeyEncrypter`]
//! for protecting the content master key, and [`ContentEncrypter`] for
//! authenticated payload encryption.
//!
//! ```
//! use tokenseal::{decode, encode, Header, OptionsOverride, Signer};
//!
//! let signer = Signer::hs256(b"shared secret".to_vec());
//! let token = encode(&Header::new(), br#"{"sub":"user"}"#, &signer)?;
//!
//! let decoded = decode(&token, |_header, _opts| Some(&signer), &OptionsOverride::none())?;
//! assert_eq!(decoded.header.alg.as_deref(), Some("HS256"));
//! # Ok::<(), tokenseal::TokenError>(())
//! ```
//!
//! Which algorithm instance to trust for a given token is the caller's
//! decision, made in the resolution callback from the decoded header
//! (typically by `kid`). The library never picks a key from data inside
//! the untrusted token.

pub mod algorithms;
mod api;
pub mod claims;
pub mod compact;
pub mod encoding;
mod error;
mod header;
mod options;

pub use algorithms::{ContentEncrypter, KeyEncrypter, RsaKeys, Signer};
pub use api::{decode, decrypt, encode, encode_json, encrypt, Decoded, Payload};
pub use error::{ClaimError, EncodingError, TokenError, TokenResult};
pub use header::Header;
pub use options::{Options, OptionsOverride};
