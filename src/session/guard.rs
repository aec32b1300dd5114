//! Route guarding based on session state.

use super::events::{HOME_ROUTE, LOGIN_ROUTE};
use super::SessionManager;

/// Access requirement of a view or command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Reachable by anyone.
    Public,
    /// Only for logged-out users (login, register).
    GuestOnly,
    /// Requires a session.
    Protected,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    Redirect { to: &'static str },
}

impl RouteDecision {
    pub fn allows(&self) -> bool {
        matches!(self, RouteDecision::Render)
    }
}

/// Decides whether a route may render given the current session.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn check(&self, session: &SessionManager, route: Route) -> RouteDecision {
        Self::decide(session.is_authenticated(), route)
    }

    fn decide(has_session: bool, route: Route) -> RouteDecision {
        match (route, has_session) {
            (Route::Public, _) => RouteDecision::Render,
            (Route::Protected, true) | (Route::GuestOnly, false) => RouteDecision::Render,
            (Route::Protected, false) => RouteDecision::Redirect { to: LOGIN_ROUTE },
            (Route::GuestOnly, true) => RouteDecision::Redirect { to: HOME_ROUTE },
        }
    }
}
