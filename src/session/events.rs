//! Session lifecycle notifications.

use std::sync::{Arc, RwLock};

/// Route the user is sent to when the session ends involuntarily.
pub const LOGIN_ROUTE: &str = "/login";

/// Route guest-only views send a logged-in user to.
pub const HOME_ROUTE: &str = "/";

/// Something the rest of the application should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: String },
    /// The access token was replaced after a 401.
    Refreshed,
    LoggedOut,
    /// Navigation side effect: show `to` next.
    Redirect { to: String },
}

/// Callback receiving session events.
pub type SessionListener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Registered listeners, called synchronously in registration order.
#[derive(Default, Clone)]
pub(crate) struct EventBus {
    listeners: Arc<RwLock<Vec<SessionListener>>>,
}

impl EventBus {
    pub(crate) fn subscribe(&self, listener: SessionListener) {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }

    pub(crate) fn publish(&self, event: SessionEvent) {
        // Snapshot so a listener may subscribe without deadlocking.
        let listeners: Vec<SessionListener> = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for listener in listeners {
            listener(&event);
        }
    }
}
