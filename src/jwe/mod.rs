//! Compact JWE tokens with `dir` key management.
//!
//! - `header`: protected header and its wire segment
//! - `compact`: five-segment compact serialization
//! - `content`: A256CBC-HS512 and A256GCM authenticated encryption
//! - `claims`: reserved claims and the validity window
//! - `encoder` / `decoder`: the issuance and verification pipelines
//! - `codec`: per-use-case settings around both

pub mod claims;
pub mod codec;
mod compact;
mod content;
pub mod decoder;
pub mod encoder;
pub mod header;

pub use claims::{Claims, Payload, SessionProfile, CLOCK_TOLERANCE_SECS};
pub use codec::TokenCodec;
pub use decoder::{decode, decode_async, decode_at, DecodeParams, DecodeStage};
pub use encoder::{encode, encode_async, encode_at, EncodeParams, DEFAULT_MAX_AGE};
pub use header::ProtectedHeader;

use crate::error::TokenError;

/// Read the protected header without decrypting.
///
/// The header is unauthenticated until decryption succeeds; use it only for
/// routing or diagnostics.
///
/// # Errors
///
/// [`TokenError::MalformedToken`] if the token is not a five-segment compact
/// JWE with a JSON header.
pub fn peek_header(token: &str) -> Result<ProtectedHeader, TokenError> {
    compact::CompactParts::parse(token).map(|parts| parts.header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::SecretList;

    #[test]
    fn test_peek_header() {
        let secrets = SecretList::single("peek-secret").unwrap();
        let token = encode(&EncodeParams::new(&serde_json::json!({}), &secrets, "salt")).unwrap();
        let header = peek_header(&token).unwrap();
        assert_eq!(header.alg, "dir");
        assert_eq!(header.enc, "A256CBC-HS512");
        assert!(header.kid.is_some());

        assert!(matches!(peek_header("nope"), Err(TokenError::MalformedToken { .. })));
    }
}
