use std::fmt;

use serde::{Deserialize, Serialize};

/// Account profile as returned by `user/me/` and `register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub email: String,
}

/// `register/` request body.
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"***")
            .field("email", &self.email)
            .finish()
    }
}
