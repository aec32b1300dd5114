//! Session manager: the single gateway between feature code and the API.
//!
//! Every authenticated call goes through [`SessionManager::request`], which
//! attaches the stored access token, and on a 401 performs one refresh with
//! the stored refresh token before re-issuing the call exactly once. When
//! the session can't be saved, credentials are wiped, listeners receive
//! [`SessionEvent::LoggedOut`] plus a redirect to [`LOGIN_ROUTE`], and the
//! caller gets [`AuthError::SessionExpired`].

pub mod events;
pub mod guard;
pub mod state;

pub use events::{SessionEvent, SessionListener, HOME_ROUTE, LOGIN_ROUTE};
pub use guard::{Route, RouteDecision, RouteGuard};
pub use state::{CallEvent, CallState, InvalidTransition, PendingCall};

use std::fmt;
use std::sync::Arc;

use reqwest::{header, Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::token::{RefreshedAccess, TokenPair};
use crate::auth::{AuthError, CredentialStore, Session};
use crate::config::FitplanConfig;
use crate::error::{FitplanError, Result};
use crate::types::{NewUser, User};

use events::EventBus;

const TOKEN_PATH: &str = "token/";
const TOKEN_REFRESH_PATH: &str = "token/refresh/";
const REGISTER_PATH: &str = "register/";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// Owns the credential store and the HTTP client for one application.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use fitplan::auth::MemoryCredentialStore;
/// use fitplan::config::FitplanConfig;
/// use fitplan::session::SessionManager;
///
/// # async fn example() -> fitplan::error::Result<()> {
/// let config = FitplanConfig::from_env();
/// let session = SessionManager::new(&config, Arc::new(MemoryCredentialStore::new()))?;
/// session.login("alice", "pw").await?;
/// let plans: serde_json::Value = session.get("workout-plans/").await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionManager {
    client: Client,
    base_url: Url,
    store: Arc<dyn CredentialStore>,
    events: EventBus,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.base_url.as_str())
            .field("store", &"..")
            .finish()
    }
}

impl SessionManager {
    pub fn new(config: &FitplanConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Ok(Self::with_client(
            config.http_client()?,
            config.parsed_base_url()?,
            store,
        ))
    }

    /// Manager backed by the file store in the configured directory.
    pub fn from_config(config: &FitplanConfig) -> Result<Self> {
        Self::new(config, Arc::new(config.credential_store()))
    }

    pub fn with_client(client: Client, base_url: Url, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            base_url,
            store,
            events: EventBus::default(),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Register a listener for session events.
    pub fn on_event(&self, listener: SessionListener) {
        self.events.subscribe(listener);
    }

    // ---------------------------------------------------------------------
    // Session lifecycle
    // ---------------------------------------------------------------------

    /// Exchange a username and password for a token pair.
    ///
    /// On success both tokens are stored and the decoded session is
    /// returned (`None` when the access token carries no readable claims).
    /// On failure the stored credentials are left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<Session>> {
        let body = LoginRequest { username, password };
        let response = self.send_anonymous(TOKEN_PATH, &body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            info!(username, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
        let pair: TokenPair = Self::parse_success(response)
            .await
            .map_err(|err| match err {
                FitplanError::Serialization(e) => AuthError::InvalidResponse(e.to_string()).into(),
                other => other,
            })?;
        self.store.save(&pair.access, &pair.refresh)?;

        let session = Session::from_token(&pair.access);
        info!(username, "Logged in");
        self.events.publish(SessionEvent::LoggedIn {
            username: session
                .as_ref()
                .and_then(|s| s.username.clone())
                .unwrap_or_else(|| username.to_string()),
        });
        Ok(session)
    }

    /// Create an account. Does not log the new user in.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<User> {
        let body = NewUser {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        let response = self.send_anonymous(REGISTER_PATH, &body).await?;
        let user = Self::parse_success(response).await?;
        info!(username, "Registered account");
        Ok(user)
    }

    /// Forget the stored credentials. Never fails and never calls the server.
    pub fn logout(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to clear credentials on logout");
        }
        info!("Logged out");
        self.events.publish(SessionEvent::LoggedOut);
    }

    /// Session decoded from the stored access token, if any.
    pub fn session(&self) -> Option<Session> {
        self.store
            .access_token()
            .as_deref()
            .and_then(Session::from_token)
    }

    /// Whether a readable session is stored. Does not touch the network.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    /// Profile of the logged-in user (`GET user/me/`).
    pub async fn current_user(&self) -> Result<User> {
        self.users().me().await
    }

    /// Check a stored session against the server at start-up.
    ///
    /// Without a stored access token this returns `None` without touching
    /// the network. Otherwise `user/me/` is fetched (refreshing once if
    /// needed); if that fails for any reason the session is dropped.
    pub async fn restore(&self) -> Option<User> {
        self.store.access_token()?;
        match self.current_user().await {
            Ok(user) => {
                debug!(username = %user.username, "Restored session");
                Some(user)
            }
            Err(err) => {
                warn!(error = %err, "Stored session is no longer valid");
                if !err.is_session_expired() {
                    self.logout();
                }
                None
            }
        }
    }

    // ---------------------------------------------------------------------
    // Authenticated requests
    // ---------------------------------------------------------------------

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    /// Issue an API call with transparent, single-shot token refresh.
    ///
    /// An empty 2xx body deserializes as JSON `null`, so `()` and
    /// `Option<T>` work for endpoints that return nothing.
    pub async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let body = body.map(serde_json::to_value).transpose()?;
        let mut call = PendingCall::new();

        advance(&mut call, CallEvent::Dispatched)?;
        let mut token = self.store.access_token();
        let mut outcome = self.send(&method, &url, body.as_ref(), token.as_deref()).await;

        loop {
            let response = match outcome {
                Ok(response) => response,
                Err(err) => {
                    advance(&mut call, CallEvent::Errored)?;
                    return Err(err.into());
                }
            };
            let status = response.status();

            if status.is_success() {
                advance(&mut call, CallEvent::Succeeded)?;
                return Self::parse_body(response).await;
            }

            if status != StatusCode::UNAUTHORIZED {
                advance(&mut call, CallEvent::Errored)?;
                debug!(%method, %url, status = status.as_u16(), "Request failed");
                return Err(Self::error_from(response).await);
            }

            let next = advance(&mut call, CallEvent::Unauthorized)?;
            if next == CallState::Failed {
                warn!(%method, %url, "Still unauthorized after refresh");
                self.terminate_session();
                return Err(AuthError::SessionExpired.into());
            }

            debug!(%method, %url, "Unauthorized, refreshing access token");
            match self.refresh_access_token(token.as_deref()).await {
                Ok(fresh) => {
                    advance(&mut call, CallEvent::RefreshSucceeded)?;
                    token = Some(fresh);
                    outcome = self.send(&method, &url, body.as_ref(), token.as_deref()).await;
                }
                Err(AuthError::SessionExpired) => {
                    advance(&mut call, CallEvent::RefreshFailed)?;
                    return Err(AuthError::SessionExpired.into());
                }
                Err(err) => {
                    advance(&mut call, CallEvent::RefreshFailed)?;
                    warn!(error = %err, "Token refresh failed");
                    self.terminate_session();
                    return Err(AuthError::SessionExpired.into());
                }
            }
        }
    }

    /// Obtain a new access token, one refresh at a time.
    ///
    /// `stale` is the token the failing call went out with. If the store
    /// already holds a different one, a concurrent call refreshed while this
    /// one waited and that token is reused instead of refreshing again. If
    /// the store is empty, that call's refresh failed and the session is
    /// already torn down: `SessionExpired` means "do not tear down again".
    async fn refresh_access_token(&self, stale: Option<&str>) -> std::result::Result<String, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.store.load();
        match current.access_token {
            Some(access) if Some(access.as_str()) != stale => {
                debug!("Access token already refreshed by another call");
                return Ok(access);
            }
            None if stale.is_some() => {
                debug!("Session already ended by another call");
                return Err(AuthError::SessionExpired);
            }
            _ => {}
        }
        let refresh = current.refresh_token.ok_or(AuthError::NotLoggedIn)?;

        let response = self
            .send_anonymous(TOKEN_REFRESH_PATH, &RefreshRequest { refresh: &refresh })
            .await
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::RefreshFailed(format!("status {status}")));
        }
        let refreshed: RefreshedAccess = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        self.store.update_access_token(&refreshed.access)?;
        info!("Access token refreshed");
        self.events.publish(SessionEvent::Refreshed);
        Ok(refreshed.access)
    }

    /// Failure path: wipe credentials and send the user to the login route.
    fn terminate_session(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to clear credentials");
        }
        warn!("Session ended, redirecting to login");
        self.events.publish(SessionEvent::LoggedOut);
        self.events.publish(SessionEvent::Redirect {
            to: LOGIN_ROUTE.to_string(),
        });
    }

    // ---------------------------------------------------------------------
    // Transport helpers
    // ---------------------------------------------------------------------

    /// Resolve `path` under the base URL. Anything that lands outside it
    /// (another origin, or `..` above the API root) is refused so the
    /// bearer token never leaves the configured API.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| FitplanError::InvalidArgument(format!("invalid API path {path}: {e}")))?;
        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path()) {
            return Err(FitplanError::InvalidArgument(format!(
                "API path {path} resolves outside {}",
                self.base_url
            )));
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> std::result::Result<Response, reqwest::Error> {
        debug!(%method, %url, authenticated = token.is_some(), "Sending request");
        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await
    }

    /// POST without credentials and without the refresh path.
    async fn send_anonymous<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.endpoint(path)?;
        let body = serde_json::to_value(body)?;
        Ok(self.send(&Method::POST, &url, Some(&body), None).await?)
    }

    async fn parse_success<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Self::parse_body(response).await
    }

    async fn parse_body<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn error_from(response: Response) -> FitplanError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        FitplanError::from_status(status, &body)
    }
}

fn advance(call: &mut PendingCall, event: CallEvent) -> Result<CallState> {
    call.apply(event)
        .map_err(|err| FitplanError::InvalidState(err.to_string()))
}
