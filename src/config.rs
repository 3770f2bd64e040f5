//! Configuration for the session-token binary and embedding hosts.
//!
//! All configuration is loaded from environment variables and validated
//! at startup.

use crate::algorithm::{AlgorithmPolicy, ContentAlgorithm};
use crate::error::TokenError;
use crate::jwe::{TokenCodec, DEFAULT_MAX_AGE};
use crate::observability::TracingConfig;
use crate::secret::SecretList;
use std::env;

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Rotation list, newest first
    pub secrets: SecretList,
    /// Use-case salt
    pub salt: String,
    /// Token lifetime in seconds
    pub max_age: i64,
    /// Issuance algorithm
    pub algorithm: ContentAlgorithm,
    /// Decode policy
    pub policy: AlgorithmPolicy,
    /// Logging setup
    pub tracing: TracingConfig,
}

impl TokenConfig {
    /// Load configuration from environment variables (and `.env`, if any).
    ///
    /// `SESSION_SECRET` is a comma-separated rotation list, newest first.
    /// Whitespace around each entry is trimmed, so a secret cannot begin or
    /// end with a space.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Config`] if required variables are missing or
    /// any value is invalid.
    pub fn from_env() -> Result<Self, TokenError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`TokenConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TokenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_secrets = lookup("SESSION_SECRET")
            .ok_or_else(|| TokenError::config("SESSION_SECRET is required"))?;
        let secrets = SecretList::new(raw_secrets.split(',').map(str::trim).map(str::to_string))
            .map_err(|_| TokenError::config("SESSION_SECRET contains an empty secret"))?;

        let salt = lookup("SESSION_SALT")
            .filter(|salt| !salt.is_empty())
            .ok_or_else(|| TokenError::config("SESSION_SALT is required"))?;

        let max_age = parse_var(&lookup, "SESSION_MAX_AGE", DEFAULT_MAX_AGE)?;

        let algorithm = match lookup("SESSION_ENC") {
            Some(name) => name
                .parse::<ContentAlgorithm>()
                .map_err(|_| TokenError::config(format!("Invalid SESSION_ENC: {}", name)))?,
            None => ContentAlgorithm::PRIMARY,
        };

        let policy = if parse_var(&lookup, "SESSION_STRICT_ALGORITHM", false)? {
            AlgorithmPolicy::Strict(algorithm)
        } else {
            AlgorithmPolicy::Compatible
        };

        let mut tracing = TracingConfig::default();
        if let Some(level) = lookup("LOG_LEVEL") {
            tracing = tracing.with_log_level(level);
        }
        if parse_var(&lookup, "LOG_JSON", false)? {
            tracing = tracing.with_json_output();
        }

        Ok(Self {
            secrets,
            salt,
            max_age,
            algorithm,
            policy,
            tracing,
        })
    }

    /// Codec carrying the salt, lifetime and algorithm settings.
    #[must_use]
    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(self.salt.clone())
            .with_max_age(self.max_age)
            .with_algorithm(self.algorithm)
            .with_policy(self.policy)
    }
}

/// Parse an optional variable.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, TokenError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| TokenError::config(format!("Invalid {}: {}", name, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<TokenConfig, TokenError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        TokenConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SESSION_SECRET", "s3cret"), ("SESSION_SALT", "salt")]).unwrap();
        assert_eq!(config.secrets.len(), 1);
        assert_eq!(config.max_age, 2_592_000);
        assert_eq!(config.algorithm, ContentAlgorithm::A256CbcHs512);
        assert_eq!(config.policy, AlgorithmPolicy::Compatible);
        assert!(!config.tracing.json_output);
    }

    #[test]
    fn test_rotation_list() {
        let config = load(&[("SESSION_SECRET", "new, old"), ("SESSION_SALT", "salt")]).unwrap();
        assert_eq!(config.secrets.current().expose_secret(), b"new");
        assert_eq!(config.secrets.legacy()[0].expose_secret(), b"old");
    }

    #[test]
    fn test_secret_entries_trimmed_at_edges_only() {
        let config = load(&[("SESSION_SECRET", "  two words ,\told\n"), ("SESSION_SALT", "salt")]).unwrap();
        assert_eq!(config.secrets.current().expose_secret(), b"two words");
        assert_eq!(config.secrets.legacy()[0].expose_secret(), b"old");
    }

    #[test]
    fn test_strict_pins_configured_algorithm() {
        let config = load(&[
            ("SESSION_SECRET", "s3cret"),
            ("SESSION_SALT", "salt"),
            ("SESSION_ENC", "A256GCM"),
            ("SESSION_STRICT_ALGORITHM", "true"),
            ("SESSION_MAX_AGE", "60"),
            ("LOG_JSON", "true"),
        ])
        .unwrap();
        assert_eq!(config.policy, AlgorithmPolicy::Strict(ContentAlgorithm::A256Gcm));
        assert_eq!(config.codec().max_age(), 60);
        assert!(config.tracing.json_output);
    }

    #[test]
    fn test_missing_required() {
        assert!(matches!(load(&[("SESSION_SALT", "salt")]), Err(TokenError::Config(_))));
        assert!(matches!(load(&[("SESSION_SECRET", "s")]), Err(TokenError::Config(_))));
        assert!(matches!(
            load(&[("SESSION_SECRET", "a,,b"), ("SESSION_SALT", "salt")]),
            Err(TokenError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let base = [("SESSION_SECRET", "s"), ("SESSION_SALT", "salt")];
        let bad_enc = [base[0], base[1], ("SESSION_ENC", "A128GCM")];
        assert!(matches!(load(&bad_enc), Err(TokenError::Config(_))));
        let bad_age = [base[0], base[1], ("SESSION_MAX_AGE", "forever")];
        assert!(matches!(load(&bad_age), Err(TokenError::Config(_))));
    }
}
