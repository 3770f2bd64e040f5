//! Token issuance.

use super::claims::issue;
use super::compact;
use super::content::seal;
use super::header::ProtectedHeader;
use crate::algorithm::ContentAlgorithm;
use crate::error::TokenError;
use crate::kdf::derive_key;
use crate::metrics::SessionMetrics;
use crate::secret::SecretList;
use crate::thumbprint::KeyThumbprint;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Default token lifetime: 30 days.
pub const DEFAULT_MAX_AGE: i64 = 30 * 24 * 60 * 60;

/// Inputs for [`encode`].
#[derive(Debug)]
pub struct EncodeParams<'a, P: ?Sized> {
    /// Payload to seal
    pub token: &'a P,
    /// Rotation list; only the current secret is used
    pub secret: &'a SecretList,
    /// Use-case context bound into the key
    pub salt: &'a str,
    /// Lifetime in seconds, relative to issuance
    pub max_age: i64,
    /// Content-encryption algorithm name
    pub enc: &'a str,
}

impl<'a, P: ?Sized> EncodeParams<'a, P> {
    /// Params with the default lifetime and algorithm.
    pub fn new(token: &'a P, secret: &'a SecretList, salt: &'a str) -> Self {
        Self {
            token,
            secret,
            salt,
            max_age: DEFAULT_MAX_AGE,
            enc: ContentAlgorithm::PRIMARY.as_str(),
        }
    }

    /// Sets the lifetime in seconds.
    #[must_use]
    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Sets the content-encryption algorithm by name.
    #[must_use]
    pub fn with_algorithm(mut self, enc: &'a str) -> Self {
        self.enc = enc;
        self
    }
}

/// Issue a token at the current time.
///
/// # Errors
///
/// [`TokenError::UnsupportedAlgorithm`] for an unknown `enc`, raised before
/// any randomness is consumed; [`TokenError::InvalidPayload`] if the payload
/// is not a JSON object.
pub fn encode<P: Serialize + ?Sized>(params: &EncodeParams<'_, P>) -> Result<String, TokenError> {
    encode_at(params, chrono::Utc::now().timestamp())
}

/// Issue a token as if the clock read `now` (Unix seconds).
///
/// # Errors
///
/// See [`encode`].
#[instrument(skip_all, fields(enc = %params.enc, max_age = params.max_age))]
pub fn encode_at<P: Serialize + ?Sized>(
    params: &EncodeParams<'_, P>,
    now: i64,
) -> Result<String, TokenError> {
    let started = Instant::now();
    let result = seal_token(params, now);

    let metrics = SessionMetrics::new();
    match &result {
        Ok(_) => {
            debug!("Token issued");
            metrics.record_operation("encode", None, started.elapsed());
        }
        Err(e) => {
            warn!(code = e.code().as_str(), "Token issuance failed");
            metrics.record_operation("encode", Some(e.code()), started.elapsed());
        }
    }
    result
}

/// Async form of [`encode`]. Holds nothing across suspension points.
///
/// # Errors
///
/// See [`encode`].
pub async fn encode_async<P: Serialize + ?Sized>(
    params: &EncodeParams<'_, P>,
) -> Result<String, TokenError> {
    encode(params)
}

fn seal_token<P: Serialize + ?Sized>(
    params: &EncodeParams<'_, P>,
    now: i64,
) -> Result<String, TokenError> {
    let key = derive_key(params.enc, params.secret.current(), params.salt)?;
    let kid = KeyThumbprint::compute(&key);

    let header_segment = ProtectedHeader::direct(key.algorithm(), kid).to_segment()?;
    let claims = issue(
        params.token,
        now,
        params.max_age,
        uuid::Uuid::new_v4().to_string(),
    )?;
    let plaintext = zeroize::Zeroizing::new(serde_json::to_vec(&claims)?);

    let sealed = seal(&key, &plaintext, header_segment.as_bytes())?;
    Ok(compact::serialize(&header_segment, &sealed))
}
