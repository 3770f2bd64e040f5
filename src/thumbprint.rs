//! Key identifier calculation per RFC 7638.
//!
//! The derived key is described as an `oct` JWK and hashed with a digest
//! whose width matches the key length. The result is the `kid` header.
//! Uses constant-time comparison for security.

use crate::kdf::DerivedKey;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Calculates symmetric key thumbprints.
pub struct KeyThumbprint;

impl KeyThumbprint {
    /// Computes the thumbprint of a derived key.
    ///
    /// 256-bit keys use SHA-256, 512-bit keys use SHA-512.
    #[must_use]
    pub fn compute(key: &DerivedKey) -> String {
        let canonical = Self::canonical_json(key.as_bytes());
        let hash = if key.bit_len() > 256 {
            Sha512::digest(canonical.as_bytes()).to_vec()
        } else {
            Sha256::digest(canonical.as_bytes()).to_vec()
        };
        URL_SAFE_NO_PAD.encode(hash)
    }

    /// Creates the canonical JSON representation for thumbprint calculation.
    ///
    /// Required members of an `oct` key are `k` and `kty`, in lexicographic
    /// order with no whitespace. Holds key material, so it is zeroized.
    fn canonical_json(key: &[u8]) -> Zeroizing<String> {
        let k = Zeroizing::new(URL_SAFE_NO_PAD.encode(key));
        Zeroizing::new(format!(r#"{{"k":"{}","kty":"oct"}}"#, k.as_str()))
    }

    /// Verifies that a thumbprint matches a key using constant-time comparison.
    #[must_use]
    pub fn verify(key: &DerivedKey, expected_thumbprint: &str) -> bool {
        let computed = Self::compute(key);
        let computed_bytes = computed.as_bytes();
        let expected_bytes = expected_thumbprint.as_bytes();

        // Digest width is public, so the length check leaks nothing
        if computed_bytes.len() != expected_bytes.len() {
            return false;
        }

        computed_bytes.ct_eq(expected_bytes).into()
    }
}

/// Shorthand for [`KeyThumbprint::compute`].
#[must_use]
pub fn thumbprint(key: &DerivedKey) -> String {
    KeyThumbprint::compute(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::ContentAlgorithm;
    use crate::kdf::derive_for;
    use crate::secret::Secret;

    fn key(algorithm: ContentAlgorithm, secret: &str) -> DerivedKey {
        derive_for(algorithm, &Secret::from(secret), "session-salt").unwrap()
    }

    #[test]
    fn test_known_answer_512() {
        let key = key(ContentAlgorithm::A256CbcHs512, "test-secret");
        assert_eq!(
            KeyThumbprint::compute(&key),
            "_C1wwA_ogoncuCVZZFlM3E-_L6n-244p8iu_eRmKq5ekEmvkD4i7ohkVKUY-8jxhxENddrGKy-uCw6Zoh6NABg"
        );
    }

    #[test]
    fn test_known_answer_256() {
        let key = key(ContentAlgorithm::A256Gcm, "test-secret");
        assert_eq!(
            KeyThumbprint::compute(&key),
            "MJH7iToapgmZPsnYtdqSlQbA98NNQfwmwO1E2vSCCzU"
        );
    }

    #[test]
    fn test_digest_width_matches_key() {
        // 64 and 32 digest bytes in unpadded base64url
        assert_eq!(thumbprint(&key(ContentAlgorithm::A256CbcHs512, "s")).len(), 86);
        assert_eq!(thumbprint(&key(ContentAlgorithm::A256Gcm, "s")).len(), 43);
    }

    #[test]
    fn test_thumbprint_deterministic() {
        let t1 = thumbprint(&key(ContentAlgorithm::A256CbcHs512, "s3cret"));
        let t2 = thumbprint(&key(ContentAlgorithm::A256CbcHs512, "s3cret"));
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_thumbprint_mismatch() {
        let k = key(ContentAlgorithm::A256CbcHs512, "s3cret");
        let other = thumbprint(&key(ContentAlgorithm::A256CbcHs512, "other"));
        assert!(!KeyThumbprint::verify(&k, &other));
        assert!(!KeyThumbprint::verify(&k, "short"));
        assert!(KeyThumbprint::verify(&k, &thumbprint(&k)));
    }

    #[test]
    fn test_canonical_json_order() {
        let canonical = KeyThumbprint::canonical_json(&[1, 2, 3]);
        assert_eq!(canonical.as_str(), r#"{"k":"AQID","kty":"oct"}"#);
    }
}
