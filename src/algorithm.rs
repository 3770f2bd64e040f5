//! Algorithm identifiers for the `dir` key-management mode.

use crate::error::TokenError;
use std::fmt;
use std::str::FromStr;

/// Key-management algorithm name: the derived key encrypts content directly.
pub const DIRECT_KEY_ALGORITHM: &str = "dir";

/// Content-encryption algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentAlgorithm {
    /// AES-256-CBC with HMAC-SHA-512 (primary, 64-byte key)
    A256CbcHs512,
    /// AES-256-GCM (accepted fallback, 32-byte key)
    A256Gcm,
}

impl ContentAlgorithm {
    /// Algorithm used for issuance unless the caller picks another.
    pub const PRIMARY: Self = Self::A256CbcHs512;

    /// Algorithm still accepted for verification of legacy tokens.
    pub const FALLBACK: Self = Self::A256Gcm;

    /// Get algorithm name for the JWE `enc` header.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A256CbcHs512 => "A256CBC-HS512",
            Self::A256Gcm => "A256GCM",
        }
    }

    /// Derived key length in bytes.
    #[must_use]
    pub const fn key_len(&self) -> usize {
        match self {
            Self::A256CbcHs512 => 64,
            Self::A256Gcm => 32,
        }
    }

    /// Initialization vector length in bytes.
    #[must_use]
    pub const fn iv_len(&self) -> usize {
        match self {
            Self::A256CbcHs512 => 16,
            Self::A256Gcm => 12,
        }
    }

    /// Authentication tag length in bytes.
    #[must_use]
    pub const fn tag_len(&self) -> usize {
        match self {
            Self::A256CbcHs512 => 32,
            Self::A256Gcm => 16,
        }
    }
}

impl FromStr for ContentAlgorithm {
    type Err = TokenError;

    /// Names are matched exactly, as they appear on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A256CBC-HS512" => Ok(Self::A256CbcHs512),
            "A256GCM" => Ok(Self::A256Gcm),
            _ => Err(TokenError::unsupported(s)),
        }
    }
}

impl fmt::Display for ContentAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which content-encryption algorithms a decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlgorithmPolicy {
    /// The primary algorithm plus the fallback.
    #[default]
    Compatible,
    /// Exactly one algorithm.
    Strict(ContentAlgorithm),
}

impl AlgorithmPolicy {
    /// Check whether `algorithm` may be used for decryption.
    #[must_use]
    pub fn accepts(&self, algorithm: ContentAlgorithm) -> bool {
        match self {
            Self::Compatible => {
                algorithm == ContentAlgorithm::PRIMARY || algorithm == ContentAlgorithm::FALLBACK
            }
            Self::Strict(pinned) => *pinned == algorithm,
        }
    }
}
