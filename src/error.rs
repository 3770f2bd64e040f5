//! Error types for token issuance and verification.
//!
//! Every variant is terminal for the call that produced it. The only
//! "no token" outcome that is not an error is `decode` returning `Ok(None)`.

use thiserror::Error;

/// Errors surfaced by encode/decode and their collaborators.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TokenError {
    /// Content-encryption or key-management algorithm is not recognized or not allowed
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Envelope or claims set could not be parsed
    #[error("Token malformed: {reason}")]
    MalformedToken {
        /// Description of the malformation (never exposed publicly)
        reason: String,
    },

    /// No secret in the rotation list produced the key named by the header
    #[error("No matching decryption secret")]
    NoMatchingSecret,

    /// Authenticated decryption failed
    #[error("Token decryption failed")]
    DecryptionFailed,

    /// Token expiration has passed
    #[error("Token expired at {expired_at}")]
    TokenExpired {
        /// Expiration claim (Unix seconds)
        expired_at: i64,
    },

    /// Token was issued in the future
    #[error("Token not yet valid until {valid_from}")]
    TokenNotYetValid {
        /// Earliest validity instant (Unix seconds)
        valid_from: i64,
    },

    /// Secret list was empty or contained an empty secret
    #[error("At least one non-empty secret is required")]
    MissingSecret,

    /// Payload could not be converted to or from a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TokenError {
    /// Create a malformed token error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        TokenError::MalformedToken {
            reason: reason.into(),
        }
    }

    /// Create an unsupported algorithm error.
    #[must_use]
    pub fn unsupported(name: impl Into<String>) -> Self {
        TokenError::UnsupportedAlgorithm(name.into())
    }

    /// Create an invalid payload error.
    #[must_use]
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        TokenError::InvalidPayload(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        TokenError::Config(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        TokenError::Internal(msg.into())
    }

    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedAlgorithm(_) => ErrorCode::UnsupportedAlgorithm,
            Self::MalformedToken { .. } => ErrorCode::MalformedToken,
            Self::NoMatchingSecret => ErrorCode::NoMatchingSecret,
            Self::DecryptionFailed => ErrorCode::DecryptionFailed,
            Self::TokenExpired { .. } => ErrorCode::TokenExpired,
            Self::TokenNotYetValid { .. } => ErrorCode::TokenNotYetValid,
            Self::MissingSecret => ErrorCode::MissingSecret,
            Self::InvalidPayload(_) => ErrorCode::InvalidPayload,
            Self::Config(_) => ErrorCode::Config,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Message safe to show to an untrusted party.
    ///
    /// Only the error kind is observable; reasons, algorithm names and
    /// timestamps stay internal.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self.code() {
            ErrorCode::UnsupportedAlgorithm => "Token algorithm is not supported",
            ErrorCode::MalformedToken => "Token is malformed",
            ErrorCode::NoMatchingSecret => "Token was not issued by a known secret",
            ErrorCode::DecryptionFailed => "Token could not be decrypted",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenNotYetValid => "Token is not yet valid",
            ErrorCode::MissingSecret | ErrorCode::InvalidPayload | ErrorCode::Config | ErrorCode::Internal => {
                "Internal error"
            }
        }
    }

    /// Token errors never succeed on retry with the same inputs.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

/// Stable error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorCode {
    UnsupportedAlgorithm,
    MalformedToken,
    NoMatchingSecret,
    DecryptionFailed,
    TokenExpired,
    TokenNotYetValid,
    MissingSecret,
    InvalidPayload,
    Config,
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedAlgorithm => "TOKEN_UNSUPPORTED_ALGORITHM",
            Self::MalformedToken => "TOKEN_MALFORMED",
            Self::NoMatchingSecret => "TOKEN_NO_MATCHING_SECRET",
            Self::DecryptionFailed => "TOKEN_DECRYPTION_FAILED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenNotYetValid => "TOKEN_NOT_YET_VALID",
            Self::MissingSecret => "TOKEN_MISSING_SECRET",
            Self::InvalidPayload => "TOKEN_INVALID_PAYLOAD",
            Self::Config => "TOKEN_CONFIG_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Whether the code describes a rejected token rather than a caller fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedAlgorithm
                | Self::MalformedToken
                | Self::NoMatchingSecret
                | Self::DecryptionFailed
                | Self::TokenExpired
                | Self::TokenNotYetValid
        )
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(err: serde_json::Error) -> Self {
        TokenError::InvalidPayload(err.to_string())
    }
}
