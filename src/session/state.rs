//! Per-call authentication state machine.
//!
//! Every call issued through [`SessionManager::request`](super::SessionManager::request)
//! walks this machine. The only path back to the network after a 401 goes
//! `Sent -> RefreshPending -> Retried`, and `Retried` has no edge to
//! `RefreshPending`, so a call can be re-issued at most once.

use strum::Display;

/// Where a single call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CallState {
    Initial,
    Sent,
    RefreshPending,
    Retried,
    Failed,
    Succeeded,
}

/// Something that happened to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CallEvent {
    /// The request left the client.
    Dispatched,
    /// 2xx response.
    Succeeded,
    /// 401 response.
    Unauthorized,
    /// Network error or non-401 error response.
    Errored,
    /// A fresh access token is available.
    RefreshSucceeded,
    /// No refresh token, or the refresh call failed.
    RefreshFailed,
}

impl CallState {
    /// Next state, or `None` when the event is not valid here.
    pub fn next(self, event: CallEvent) -> Option<CallState> {
        use CallEvent as E;
        use CallState as S;
        match (self, event) {
            (S::Initial, E::Dispatched) => Some(S::Sent),
            (S::Sent, E::Succeeded) => Some(S::Succeeded),
            (S::Sent, E::Unauthorized) => Some(S::RefreshPending),
            (S::Sent, E::Errored) => Some(S::Failed),
            (S::RefreshPending, E::RefreshSucceeded) => Some(S::Retried),
            (S::RefreshPending, E::RefreshFailed) => Some(S::Failed),
            (S::Retried, E::Succeeded) => Some(S::Succeeded),
            (S::Retried, E::Unauthorized) => Some(S::Failed),
            (S::Retried, E::Errored) => Some(S::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Failed | CallState::Succeeded)
    }
}

/// One call's journey through [`CallState`], with its trail kept for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct PendingCall {
    state: CallState,
    history: Vec<CallState>,
}

impl Default for PendingCall {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingCall {
    pub fn new() -> Self {
        Self {
            state: CallState::Initial,
            history: vec![CallState::Initial],
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    /// Every state visited so far, starting with `Initial`.
    pub fn history(&self) -> &[CallState] {
        &self.history
    }

    /// Number of times this call went out over the network.
    pub fn attempts(&self) -> usize {
        self.history
            .iter()
            .filter(|s| matches!(s, CallState::Sent | CallState::Retried))
            .count()
    }

    /// Apply an event. On an invalid transition the state is left untouched.
    pub fn apply(&mut self, event: CallEvent) -> Result<CallState, InvalidTransition> {
        let next = self.state.next(event).ok_or(InvalidTransition {
            from: self.state,
            event,
        })?;
        self.state = next;
        self.history.push(next);
        Ok(next)
    }
}

/// Rejected state-machine edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: CallState,
    pub event: CallEvent,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no transition from {} on {}", self.from, self.event)
    }
}

impl std::error::Error for InvalidTransition {}
