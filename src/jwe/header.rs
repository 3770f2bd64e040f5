//! JWE protected header.

use crate::algorithm::{ContentAlgorithm, DIRECT_KEY_ALGORITHM};
use crate::error::TokenError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Protected header of a `dir` JWE.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtectedHeader {
    /// Key-management algorithm, always `dir` for issued tokens
    pub alg: String,
    /// Content-encryption algorithm name
    pub enc: String,
    /// Thumbprint of the key that encrypted the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl ProtectedHeader {
    /// Header for a token encrypted directly with the key named by `kid`.
    #[must_use]
    pub fn direct(enc: ContentAlgorithm, kid: String) -> Self {
        Self {
            alg: DIRECT_KEY_ALGORITHM.to_string(),
            enc: enc.as_str().to_string(),
            kid: Some(kid),
        }
    }

    /// Base64url segment; its ASCII bytes are the AEAD additional data.
    pub(crate) fn to_segment(&self) -> Result<String, TokenError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| TokenError::internal(format!("Header serialization failed: {}", e)))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Parse the first segment of a compact token.
    pub(crate) fn from_segment(segment: &str) -> Result<Self, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|_| TokenError::malformed("protected header is not base64url"))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| TokenError::malformed("protected header is not a valid JSON object"))
    }
}
