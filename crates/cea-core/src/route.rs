//! Navigation gate.
//!
//! Decides from the session state alone whether a requested view may be
//! shown. The decision is a pure function; [`RouteGate`] re-evaluates it
//! whenever the session store publishes a new state.

use crate::session::SessionState;
use tokio::sync::watch;

/// Views the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Dashboard,
    History,
}

impl View {
    /// Whether the view is only reachable with a session.
    pub fn requires_session(self) -> bool {
        !matches!(self, View::Login)
    }

    pub fn path(self) -> &'static str {
        match self {
            View::Login => "/login",
            View::Dashboard => "/dashboard",
            View::History => "/history",
        }
    }

    /// Resolves a location; `/` lands on the dashboard.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" | "/dashboard" => Some(View::Dashboard),
            "/login" => Some(View::Login),
            "/history" => Some(View::History),
            _ => None,
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session is still being restored; show only a placeholder.
    Loading,
    Render(View),
    /// The original request is discarded.
    Redirect(View),
}

/// Gate decision for `requested` under `state`.
pub fn decide(state: &SessionState, requested: View) -> RouteDecision {
    if !requested.requires_session() {
        return RouteDecision::Render(requested);
    }
    match state {
        SessionState::Initializing => RouteDecision::Loading,
        SessionState::Authenticated(_) => RouteDecision::Render(requested),
        SessionState::Unauthenticated => RouteDecision::Redirect(View::Login),
    }
}

/// Reactive wrapper around [`decide`] for one navigation target.
pub struct RouteGate {
    receiver: watch::Receiver<SessionState>,
    requested: View,
}

impl RouteGate {
    pub fn new(receiver: watch::Receiver<SessionState>, requested: View) -> Self {
        Self {
            receiver,
            requested,
        }
    }

    pub fn requested(&self) -> View {
        self.requested
    }

    /// Decision for the current session snapshot.
    pub fn current(&self) -> RouteDecision {
        decide(&self.receiver.borrow(), self.requested)
    }

    /// Changes the navigation target and returns the new decision.
    pub fn navigate(&mut self, requested: View) -> RouteDecision {
        self.requested = requested;
        self.current()
    }

    /// Waits for the next session change and returns the re-evaluated decision.
    ///
    /// Returns `None` once the session store has been dropped.
    pub async fn changed(&mut self) -> Option<RouteDecision> {
        self.receiver.changed().await.ok()?;
        Some(decide(&self.receiver.borrow_and_update(), self.requested))
    }
}
