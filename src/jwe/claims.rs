//! Session claims.
//!
//! The caller's payload is any serde type that serializes to a JSON object.
//! Issuance adds `iat`, `exp` and `jti`; decoding hands them back next to the
//! payload so they never have to be declared in the caller's type.

use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped payload: a JSON object.
pub type Payload = Map<String, Value>;

/// Clock skew tolerated on both sides of the validity window, in seconds.
pub const CLOCK_TOLERANCE_SECS: i64 = 15;

/// Claim names injected at issuance.
pub const RESERVED_CLAIMS: [&str; 3] = ["iat", "exp", "jti"];

/// Decoded claims: reserved claims plus the caller payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims<P = Payload> {
    /// Issued-at (Unix seconds)
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    /// Expiration (Unix seconds)
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Not-before (Unix seconds); never issued here but honored when present
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,
    /// Random token identifier for replay-log correlation
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    /// Application payload
    #[serde(flatten)]
    pub payload: P,
}

impl<P> Claims<P> {
    /// Checks the validity window at `now` with [`CLOCK_TOLERANCE_SECS`].
    ///
    /// # Errors
    ///
    /// [`TokenError::TokenExpired`] if `now` is past `exp` plus tolerance, or
    /// if the token was issued already expired (`exp < iat`).
    /// [`TokenError::TokenNotYetValid`] if `now` is before `iat` or `nbf`
    /// minus tolerance.
    pub fn validate_at(&self, now: i64) -> Result<(), TokenError> {
        if let Some(exp) = self.expires_at {
            let issued_expired = self.issued_at.is_some_and(|iat| exp < iat);
            if issued_expired || now > exp.saturating_add(CLOCK_TOLERANCE_SECS) {
                return Err(TokenError::TokenExpired { expired_at: exp });
            }
        }

        for valid_from in [self.issued_at, self.not_before].into_iter().flatten() {
            if now < valid_from.saturating_sub(CLOCK_TOLERANCE_SECS) {
                return Err(TokenError::TokenNotYetValid { valid_from });
            }
        }

        Ok(())
    }

    /// Whether the claims pass [`Claims::validate_at`] at `timestamp`.
    pub fn is_valid_at(&self, timestamp: i64) -> bool {
        self.validate_at(timestamp).is_ok()
    }

    /// Lifetime granted at issuance, if both timestamps are present.
    pub fn max_age(&self) -> Option<i64> {
        self.expires_at?.checked_sub(self.issued_at?)
    }
}

/// Serialize `payload` and merge the reserved claims into it.
///
/// Reserved claims overwrite same-named payload members.
pub(crate) fn issue<P: Serialize + ?Sized>(
    payload: &P,
    issued_at: i64,
    max_age: i64,
    token_id: String,
) -> Result<Payload, TokenError> {
    let mut object = match serde_json::to_value(payload)? {
        Value::Object(object) => object,
        Value::Null => Map::new(),
        other => {
            return Err(TokenError::invalid_payload(format!(
                "payload must serialize to a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    let [iat, exp, jti] = RESERVED_CLAIMS;
    object.insert(iat.to_string(), Value::from(issued_at));
    object.insert(exp.to_string(), Value::from(issued_at.saturating_add(max_age)));
    object.insert(jti.to_string(), Value::from(token_id));
    Ok(object)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Default session payload shape: profile fields plus anything else.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionProfile {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Subject identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Application-defined members
    #[serde(flatten)]
    pub extra: Payload,
}

impl SessionProfile {
    /// Profile for a subject.
    #[must_use]
    pub fn for_subject(sub: impl Into<String>) -> Self {
        Self {
            sub: Some(sub.into()),
            ..Self::default()
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }

    /// Adds an application-defined member.
    #[must_use]
    pub fn with_claim(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(iat: i64, exp: i64) -> Claims {
        Claims {
            issued_at: Some(iat),
            expires_at: Some(exp),
            not_before: None,
            token_id: Some("jti".to_string()),
            payload: Payload::new(),
        }
    }

    #[test]
    fn test_issue_merges_reserved_claims() {
        let payload = json!({"name": "Ada", "exp": 1});
        let object = issue(&payload, 1_000, 60, "id-1".to_string()).unwrap();
        assert_eq!(object["name"], json!("Ada"));
        assert_eq!(object["iat"], json!(1_000));
        assert_eq!(object["exp"], json!(1_060));
        assert_eq!(object["jti"], json!("id-1"));
    }

    #[test]
    fn test_issue_overwrites_every_reserved_claim() {
        let payload = json!({"iat": "x", "exp": "y", "jti": 7, "keep": true});
        let object = issue(&payload, 500, 10, "fresh".to_string()).unwrap();
        for name in RESERVED_CLAIMS {
            assert_ne!(object[name], payload[name], "{}", name);
        }
        assert_eq!(object["keep"], json!(true));
        assert_eq!(object.len(), RESERVED_CLAIMS.len() + 1);
    }

    #[test]
    fn test_issue_rejects_non_objects() {
        let result = issue(&vec![1, 2, 3], 0, 60, "id".to_string());
        assert!(matches!(result, Err(TokenError::InvalidPayload(_))));
        let unit = issue(&(), 0, 60, "id".to_string()).unwrap();
        assert_eq!(unit.len(), 3);
    }

    #[test]
    fn test_expiry_tolerance() {
        let c = claims(900, 1_000);
        assert!(c.validate_at(1_000).is_ok());
        assert!(c.validate_at(1_015).is_ok());
        assert!(matches!(
            c.validate_at(1_016),
            Err(TokenError::TokenExpired { expired_at: 1_000 })
        ));
    }

    #[test]
    fn test_issued_expired() {
        let c = claims(1_000, 999);
        assert!(matches!(c.validate_at(1_000), Err(TokenError::TokenExpired { .. })));
    }

    #[test]
    fn test_not_yet_valid() {
        let c = claims(1_000, 2_000);
        assert!(c.validate_at(985).is_ok());
        assert!(matches!(
            c.validate_at(984),
            Err(TokenError::TokenNotYetValid { valid_from: 1_000 })
        ));

        let mut nbf = claims(1_000, 2_000);
        nbf.not_before = Some(1_500);
        assert!(!nbf.is_valid_at(1_400));
        assert!(nbf.is_valid_at(1_490));
    }

    #[test]
    fn test_missing_timestamps_pass() {
        let c: Claims = Claims {
            issued_at: None,
            expires_at: None,
            not_before: None,
            token_id: None,
            payload: Payload::new(),
        };
        assert!(c.validate_at(0).is_ok());
        assert_eq!(c.max_age(), None);
    }

    #[test]
    fn test_flattened_deserialization() {
        let claims: Claims<SessionProfile> = serde_json::from_value(json!({
            "name": "Ada", "sub": "user-1", "role": "admin",
            "iat": 10, "exp": 20, "jti": "abc"
        }))
        .unwrap();
        assert_eq!(claims.issued_at, Some(10));
        assert_eq!(claims.max_age(), Some(10));
        assert_eq!(claims.payload.name.as_deref(), Some("Ada"));
        assert_eq!(claims.payload.extra.get("role"), Some(&json!("admin")));
        assert!(!claims.payload.extra.contains_key("iat"));
    }

    #[test]
    fn test_profile_builder() {
        let profile = SessionProfile::for_subject("user-1")
            .with_name("Ada")
            .with_email("ada@example.com")
            .with_claim("role", json!("admin"));
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["sub"], json!("user-1"));
        assert_eq!(value["role"], json!("admin"));
        assert!(value.get("picture").is_none());
    }
}
