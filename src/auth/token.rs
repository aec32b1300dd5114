use serde::{Deserialize, Serialize};

/// Access/refresh token pair held by a credential store.
///
/// Either half may be missing: a store that was never written, or one that
/// was cleared, yields `Credentials::default()`.
///
/// # Example
/// ```
/// use fitplan::auth::Credentials;
///
/// let creds = Credentials::new("access", "refresh");
/// assert!(creds.is_complete());
/// assert!(Credentials::default().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }
}

/// `POST token/` response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// `POST token/refresh/` response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshedAccess {
    pub access: String,
}
