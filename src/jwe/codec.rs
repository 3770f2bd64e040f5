//! Reusable encode/decode settings.

use super::claims::Claims;
use super::decoder::{decode, decode_at, DecodeParams};
use super::encoder::{encode, encode_at, EncodeParams, DEFAULT_MAX_AGE};
use crate::algorithm::{AlgorithmPolicy, ContentAlgorithm};
use crate::error::TokenError;
use crate::secret::SecretList;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Salt, lifetime and algorithm settings shared by every call for one use
/// case. Secrets are passed per call so rotation never requires a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCodec {
    salt: String,
    max_age: i64,
    algorithm: ContentAlgorithm,
    policy: AlgorithmPolicy,
}

impl TokenCodec {
    /// Codec with the default lifetime, primary algorithm and compatible policy.
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            max_age: DEFAULT_MAX_AGE,
            algorithm: ContentAlgorithm::PRIMARY,
            policy: AlgorithmPolicy::Compatible,
        }
    }

    /// Sets the token lifetime in seconds.
    #[must_use]
    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Sets the issuance algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: ContentAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the decode policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AlgorithmPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Salt bound into every derived key.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Lifetime in seconds.
    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    /// Issuance algorithm.
    pub fn algorithm(&self) -> ContentAlgorithm {
        self.algorithm
    }

    /// Decode policy.
    pub fn policy(&self) -> AlgorithmPolicy {
        self.policy
    }

    fn encode_params<'a, P: ?Sized>(
        &'a self,
        payload: &'a P,
        secrets: &'a SecretList,
    ) -> EncodeParams<'a, P> {
        EncodeParams::new(payload, secrets, &self.salt)
            .with_max_age(self.max_age)
            .with_algorithm(self.algorithm.as_str())
    }

    fn decode_params<'a>(&'a self, token: Option<&'a str>, secrets: &'a SecretList) -> DecodeParams<'a> {
        DecodeParams::new(token, secrets, &self.salt).with_policy(self.policy)
    }

    /// Issue a token with the current secret.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn encode<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        secrets: &SecretList,
    ) -> Result<String, TokenError> {
        encode(&self.encode_params(payload, secrets))
    }

    /// Issue a token as if the clock read `now`.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn encode_at<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        secrets: &SecretList,
        now: i64,
    ) -> Result<String, TokenError> {
        encode_at(&self.encode_params(payload, secrets), now)
    }

    /// Verify a token against the rotation list.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode<P: DeserializeOwned>(
        &self,
        token: Option<&str>,
        secrets: &SecretList,
    ) -> Result<Option<Claims<P>>, TokenError> {
        decode(&self.decode_params(token, secrets))
    }

    /// Verify a token as if the clock read `now`.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode_at<P: DeserializeOwned>(
        &self,
        token: Option<&str>,
        secrets: &SecretList,
        now: i64,
    ) -> Result<Option<Claims<P>>, TokenError> {
        decode_at(&self.decode_params(token, secrets), now)
    }

    /// Async form of [`TokenCodec::encode`].
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub async fn encode_async<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        secrets: &SecretList,
    ) -> Result<String, TokenError> {
        self.encode(payload, secrets)
    }

    /// Async form of [`TokenCodec::decode`].
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub async fn decode_async<P: DeserializeOwned>(
        &self,
        token: Option<&str>,
        secrets: &SecretList,
    ) -> Result<Option<Claims<P>>, TokenError> {
        self.decode(token, secrets)
    }
}
