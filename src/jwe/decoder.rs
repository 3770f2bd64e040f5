//! Token verification.
//!
//! Decoding runs through four stages and stops at the first failure:
//! parsing, key selection, decryption, validity check. There are no retries
//! inside a call.

use super::claims::{Claims, Payload};
use super::compact::CompactParts;
use super::content::open;
use crate::algorithm::{AlgorithmPolicy, ContentAlgorithm, DIRECT_KEY_ALGORITHM};
use crate::error::TokenError;
use crate::kdf::{derive_for, DerivedKey};
use crate::metrics::SessionMetrics;
use crate::secret::SecretList;
use crate::thumbprint::KeyThumbprint;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Decode pipeline stage, reported with rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Splitting the envelope and reading the header
    Parsing,
    /// Matching the header `kid` against the rotation list
    KeySelection,
    /// Authenticated decryption
    Decrypting,
    /// Time-based validity of the claims
    ValidityCheck,
}

impl DecodeStage {
    /// Stage name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::KeySelection => "key_selection",
            Self::Decrypting => "decrypting",
            Self::ValidityCheck => "validity_check",
        }
    }
}

/// Inputs for [`decode`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeParams<'a> {
    /// Token presented by the client, if any
    pub token: Option<&'a str>,
    /// Rotation list, newest first
    pub secret: &'a SecretList,
    /// Must match the salt used at issuance
    pub salt: &'a str,
    /// Accepted content-encryption algorithms
    pub policy: AlgorithmPolicy,
}

impl<'a> DecodeParams<'a> {
    /// Params with the compatible algorithm policy.
    #[must_use]
    pub fn new(token: Option<&'a str>, secret: &'a SecretList, salt: &'a str) -> Self {
        Self {
            token,
            secret,
            salt,
            policy: AlgorithmPolicy::Compatible,
        }
    }

    /// Sets the algorithm policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AlgorithmPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Verify a token at the current time.
///
/// Returns `Ok(None)` when no token (or an empty one) was presented.
///
/// # Errors
///
/// One of [`TokenError::MalformedToken`], [`TokenError::UnsupportedAlgorithm`],
/// [`TokenError::NoMatchingSecret`], [`TokenError::DecryptionFailed`],
/// [`TokenError::TokenExpired`], [`TokenError::TokenNotYetValid`], or
/// [`TokenError::InvalidPayload`] when the claims do not fit `P`.
pub fn decode<P: DeserializeOwned>(
    params: &DecodeParams<'_>,
) -> Result<Option<Claims<P>>, TokenError> {
    decode_at(params, chrono::Utc::now().timestamp())
}

/// Verify a token as if the clock read `now` (Unix seconds).
///
/// # Errors
///
/// See [`decode`].
#[instrument(skip_all, fields(secrets = params.secret.len()))]
pub fn decode_at<P: DeserializeOwned>(
    params: &DecodeParams<'_>,
    now: i64,
) -> Result<Option<Claims<P>>, TokenError> {
    let token = match params.token {
        Some(token) if !token.is_empty() => token,
        _ => return Ok(None),
    };

    let started = Instant::now();
    let metrics = SessionMetrics::new();
    match open_token(token, params, now, &metrics) {
        Ok(claims) => {
            metrics.record_operation("decode", None, started.elapsed());
            Ok(Some(claims))
        }
        Err((stage, e)) => {
            warn!(stage = stage.as_str(), code = e.code().as_str(), "Token rejected");
            metrics.record_operation("decode", Some(e.code()), started.elapsed());
            Err(e)
        }
    }
}

/// Async form of [`decode`]. Holds nothing across suspension points.
///
/// # Errors
///
/// See [`decode`].
pub async fn decode_async<P: DeserializeOwned>(
    params: &DecodeParams<'_>,
) -> Result<Option<Claims<P>>, TokenError> {
    decode(params)
}

fn open_token<P: DeserializeOwned>(
    token: &str,
    params: &DecodeParams<'_>,
    now: i64,
    metrics: &SessionMetrics,
) -> Result<Claims<P>, (DecodeStage, TokenError)> {
    let at = |stage: DecodeStage| move |e: TokenError| (stage, e);

    let parts = CompactParts::parse(token).map_err(at(DecodeStage::Parsing))?;
    let algorithm = accepted_algorithm(&parts, params.policy).map_err(at(DecodeStage::Parsing))?;

    let (index, key) = select_key(parts.header.kid.as_deref(), algorithm, params.secret, params.salt)
        .map_err(at(DecodeStage::KeySelection))?;
    debug!(index, legacy = index > 0, "Decryption secret selected");
    metrics.record_secret_match(index);

    let plaintext = open(
        &key,
        &parts.iv,
        &parts.ciphertext,
        &parts.tag,
        parts.header_segment.as_bytes(),
    )
    .map_err(at(DecodeStage::Decrypting))?;

    let claims: Claims<Payload> = serde_json::from_slice(&plaintext)
        .map_err(|_| TokenError::malformed("claims set is not a valid JSON object"))
        .map_err(at(DecodeStage::ValidityCheck))?;
    claims.validate_at(now).map_err(at(DecodeStage::ValidityCheck))?;

    let payload: P = serde_json::from_value(Value::Object(claims.payload))
        .map_err(TokenError::from)
        .map_err(at(DecodeStage::ValidityCheck))?;

    Ok(Claims {
        issued_at: claims.issued_at,
        expires_at: claims.expires_at,
        not_before: claims.not_before,
        token_id: claims.token_id,
        payload,
    })
}

/// Header `alg` must be `dir` and `enc` must be known and allowed by policy.
fn accepted_algorithm(
    parts: &CompactParts<'_>,
    policy: AlgorithmPolicy,
) -> Result<ContentAlgorithm, TokenError> {
    if parts.header.alg != DIRECT_KEY_ALGORITHM {
        return Err(TokenError::unsupported(parts.header.alg.as_str()));
    }
    let algorithm: ContentAlgorithm = parts.header.enc.parse()?;
    if !policy.accepts(algorithm) {
        return Err(TokenError::unsupported(algorithm.as_str()));
    }
    Ok(algorithm)
}

/// First secret whose key thumbprint equals `kid`; without a `kid`, the
/// current secret.
fn select_key(
    kid: Option<&str>,
    algorithm: ContentAlgorithm,
    secrets: &SecretList,
    salt: &str,
) -> Result<(usize, DerivedKey), TokenError> {
    for (index, secret) in secrets.iter().enumerate() {
        let key = derive_for(algorithm, secret, salt)?;
        match kid {
            None => return Ok((index, key)),
            Some(kid) if KeyThumbprint::verify(&key, kid) => return Ok((index, key)),
            Some(_) => {}
        }
    }
    Err(TokenError::NoMatchingSecret)
}
