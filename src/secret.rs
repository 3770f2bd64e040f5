//! Secrets and rotation lists.
//!
//! A [`SecretList`] is ordered newest first: index 0 issues tokens, the rest
//! only keep outstanding tokens decodable during a rotation window.

use crate::error::TokenError;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque application secret. Zeroized on drop and redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap raw secret bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the secret bytes for key derivation.
    #[must_use]
    pub fn expose_secret(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&[u8]> for Secret {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

/// Non-empty, ordered rotation list of secrets.
#[derive(Clone, Debug)]
pub struct SecretList {
    secrets: Vec<Secret>,
}

impl SecretList {
    /// Build a rotation list, newest secret first.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingSecret`] if the sequence is empty or any
    /// secret in it is empty.
    pub fn new<I, S>(secrets: I) -> Result<Self, TokenError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Secret>,
    {
        let secrets: Vec<Secret> = secrets.into_iter().map(Into::into).collect();
        if secrets.is_empty() || secrets.iter().any(Secret::is_empty) {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self { secrets })
    }

    /// Build a list holding one secret.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingSecret`] if the secret is empty.
    pub fn single(secret: impl Into<Secret>) -> Result<Self, TokenError> {
        Self::new([secret.into()])
    }

    /// Secret used for issuance.
    #[must_use]
    pub fn current(&self) -> &Secret {
        &self.secrets[0]
    }

    /// Secrets kept only for decoding, oldest last.
    #[must_use]
    pub fn legacy(&self) -> &[Secret] {
        &self.secrets[1..]
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Secret> {
        self.secrets.iter()
    }

    /// Number of secrets (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Return a new list with `secret` prepended as the current secret.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingSecret`] if the new secret is empty.
    pub fn rotated(&self, secret: impl Into<Secret>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let mut secrets = Vec::with_capacity(self.secrets.len() + 1);
        secrets.push(secret);
        secrets.extend(self.secrets.iter().cloned());
        Ok(Self { secrets })
    }
}
