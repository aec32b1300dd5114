use crate::error::Result;
use crate::session::SessionManager;
use crate::types::User;

/// `user/` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    session: &'a SessionManager,
}

impl<'a> UsersApi<'a> {
    pub fn new(session: &'a SessionManager) -> Self {
        Self { session }
    }

    /// Profile of the user owning the current access token.
    pub async fn me(&self) -> Result<User> {
        self.session.get("user/me/").await
    }
}

impl SessionManager {
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }
}
