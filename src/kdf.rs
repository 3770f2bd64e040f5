//! Encryption key derivation.
//!
//! HKDF-SHA256 over the secret, with the salt as HKDF salt and an info
//! string that embeds the salt. The info prefix is shared with tokens issued
//! by the existing JavaScript deployments, so it must not change.

use crate::algorithm::ContentAlgorithm;
use crate::error::TokenError;
use crate::secret::Secret;
use ring::hkdf;
use std::fmt;
use zeroize::Zeroizing;

const INFO_PREFIX: &str = "Auth.js Generated Encryption Key";

/// Output length request for `ring::hkdf`.
struct KeyLen(usize);

impl hkdf::KeyType for KeyLen {
    fn len(&self) -> usize {
        self.0
    }
}

/// Symmetric key bound to one content-encryption algorithm.
///
/// Lives for a single encode/decode call and is zeroized on drop.
pub struct DerivedKey {
    algorithm: ContentAlgorithm,
    bytes: Zeroizing<Vec<u8>>,
}

impl DerivedKey {
    /// Algorithm whose key length this key satisfies.
    #[must_use]
    pub const fn algorithm(&self) -> ContentAlgorithm {
        self.algorithm
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Key length in bits.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bytes.len() << 3
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("algorithm", &self.algorithm)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the key for the algorithm named `enc`.
///
/// # Errors
///
/// Returns [`TokenError::UnsupportedAlgorithm`] for an unknown name, before
/// any key material is produced.
pub fn derive_key(enc: &str, secret: &Secret, salt: &str) -> Result<DerivedKey, TokenError> {
    let algorithm: ContentAlgorithm = enc.parse()?;
    derive_for(algorithm, secret, salt)
}

/// Derive the key for an already-parsed algorithm.
///
/// # Errors
///
/// Returns [`TokenError::Internal`] only if HKDF rejects the output length,
/// which cannot happen for the supported algorithms.
pub fn derive_for(
    algorithm: ContentAlgorithm,
    secret: &Secret,
    salt: &str,
) -> Result<DerivedKey, TokenError> {
    let len = algorithm.key_len();
    let info = format!("{} ({})", INFO_PREFIX, salt);
    let info = [info.as_bytes()];

    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, salt.as_bytes()).extract(secret.expose_secret());
    let okm = prk
        .expand(&info, KeyLen(len))
        .map_err(|_| TokenError::internal("HKDF expand failed"))?;

    let mut bytes = Zeroizing::new(vec![0u8; len]);
    okm.fill(bytes.as_mut_slice())
        .map_err(|_| TokenError::internal("HKDF fill failed"))?;

    Ok(DerivedKey { algorithm, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference values computed with an independent HKDF implementation.
    const CBC_KEY_HEX: &str = "a5d2d0a4b797b37efaff9dd6f79b4502b24d18606cc27a669d69ca594b473a0d\
                               47d6c6e118d29ebf0b9daf3eac4968cd5f11406f47ea88d3e57a9ad95b587a03";

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_known_answer_cbc() {
        let key = derive_key("A256CBC-HS512", &Secret::from("test-secret"), "session-salt").unwrap();
        assert_eq!(key.as_bytes().len(), 64);
        assert_eq!(hex(key.as_bytes()), CBC_KEY_HEX);
    }

    #[test]
    fn test_known_answer_gcm() {
        let key = derive_key("A256GCM", &Secret::from("test-secret"), "session-salt").unwrap();
        assert_eq!(key.bit_len(), 256);
        assert_eq!(hex(key.as_bytes()), &CBC_KEY_HEX[..64]);
    }

    #[test]
    fn test_deterministic() {
        let secret = Secret::from("s3cret");
        let a = derive_for(ContentAlgorithm::A256CbcHs512, &secret, "salt").unwrap();
        let b = derive_for(ContentAlgorithm::A256CbcHs512, &secret, "salt").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_salt_separates_keys() {
        let secret = Secret::from("s3cret");
        let a = derive_for(ContentAlgorithm::A256Gcm, &secret, "session").unwrap();
        let b = derive_for(ContentAlgorithm::A256Gcm, &secret, "csrf").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_unsupported_algorithm() {
        let result = derive_key("A128CBC-HS256", &Secret::from("s3cret"), "salt");
        assert!(matches!(result, Err(TokenError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = derive_for(ContentAlgorithm::A256Gcm, &Secret::from("s3cret"), "salt").unwrap();
        assert!(format!("{:?}", key).contains("REDACTED"));
    }
}
