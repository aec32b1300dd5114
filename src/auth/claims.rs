//! Identity claims carried by an access token.
//!
//! Claims are decoded without verifying the token signature. They are only
//! good for display ("who is logged in"); every authorization decision is
//! made by the API server.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AuthError;

/// The logged-in identity, derived from the stored access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Expiry as seconds since the unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Any claim not mapped above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Decode the payload segment of a JWT-shaped token.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let mut parts = token.split('.');
        let _header = parts
            .next()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AuthError::InvalidToken("missing header".into()))?;
        let payload = parts
            .next()
            .ok_or_else(|| AuthError::InvalidToken("missing payload".into()))?;
        // Some issuers pad the segment even though JWTs shouldn't be.
        let decoded = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| AuthError::InvalidToken("payload is not base64url".into()))?;
        let value: Value = serde_json::from_slice(&decoded)
            .map_err(|_| AuthError::InvalidToken("payload is not JSON".into()))?;
        if !value.is_object() {
            return Err(AuthError::InvalidToken("payload is not a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Decode, mapping every failure to "no session".
    pub fn from_token(token: &str) -> Option<Self> {
        Self::decode(token).ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Whether the `exp` claim is in the past. Tokens without `exp` never
    /// count as expired here; the server has the final word.
    pub fn is_expired(&self) -> bool {
        self.expires_at().map(|at| at <= Utc::now()).unwrap_or(false)
    }

    /// Best display name available.
    pub fn display_name(&self) -> String {
        match (&self.username, self.user_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("user #{id}"),
            (None, None) => "unknown user".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
