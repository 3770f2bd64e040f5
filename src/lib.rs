//! Stateless encrypted session tokens.
//!
//! Tokens are compact JWEs using direct key agreement (`dir`) with
//! `A256CBC-HS512` (or the legacy `A256GCM`). The content key is derived
//! from an application secret and a use-case salt with HKDF, and the
//! protected header names it with an RFC 7638 thumbprint so a rotation list
//! of secrets can be searched on decode.
//!
//! ```no_run
//! use session_token::{decode, encode, Claims, DecodeParams, EncodeParams, SecretList};
//!
//! # fn main() -> Result<(), session_token::TokenError> {
//! let secrets = SecretList::new(["current-secret", "previous-secret"])?;
//! let payload = serde_json::json!({"sub": "user-1", "name": "Ada"});
//!
//! let token = encode(&EncodeParams::new(&payload, &secrets, "authjs.session-token"))?;
//! let claims: Option<Claims> =
//!     decode(&DecodeParams::new(Some(&token), &secrets, "authjs.session-token"))?;
//! assert!(claims.is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod config;
pub mod error;
pub mod jwe;
pub mod kdf;
pub mod metrics;
pub mod observability;
pub mod secret;
pub mod thumbprint;

// Re-exports for convenience
pub use algorithm::{AlgorithmPolicy, ContentAlgorithm};
pub use config::TokenConfig;
pub use error::{ErrorCode, TokenError};
pub use jwe::{
    decode, decode_async, decode_at, encode, encode_async, encode_at, peek_header, Claims,
    DecodeParams, EncodeParams, Payload, ProtectedHeader, SessionProfile, TokenCodec,
};
pub use kdf::{derive_key, DerivedKey};
pub use secret::{Secret, SecretList};
pub use thumbprint::{thumbprint, KeyThumbprint};
