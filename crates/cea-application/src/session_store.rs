//! Session lifecycle: restore, login, register, logout and invalidation.

use cea_core::api::{AnalysisApi, Credentials, Registration};
use cea_core::error::{CeaError, Result};
use cea_core::route::{RouteGate, View};
use cea_core::session::{CredentialRepository, Session, SessionState};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// Shown when a login attempt fails without service-provided text.
pub const LOGIN_FAILED: &str = "Login failed";
/// Shown when a registration fails without service-provided text.
pub const REGISTRATION_FAILED: &str = "Registration failed";

const CREDENTIALS_REQUIRED: &str = "Email and password are required";

/// Owns the authentication state and its persisted credential.
///
/// State changes are published on a watch channel; consumers hold a
/// receiver (or a [`RouteGate`]) instead of reading shared globals.
pub struct SessionStore {
    state: watch::Sender<SessionState>,
    credentials: Arc<dyn CredentialRepository>,
    api: Arc<dyn AnalysisApi>,
    /// Serializes login and register attempts
    auth_guard: Mutex<()>,
}

impl SessionStore {
    /// Creates a store in the `Initializing` state. Call [`restore`](Self::restore)
    /// before showing any gated view.
    pub fn new(credentials: Arc<dyn CredentialRepository>, api: Arc<dyn AnalysisApi>) -> Self {
        let (state, _) = watch::channel(SessionState::Initializing);
        Self {
            state,
            credentials,
            api,
            auth_guard: Mutex::new(()),
        }
    }

    /// Settles the initial state from the persisted credential.
    ///
    /// The stored token is trusted as-is; no request is made. An unreadable
    /// credential file counts as no session.
    pub fn restore(&self) -> SessionState {
        let next = match self.credentials.load() {
            Ok(Some(session)) => {
                tracing::info!("[Session] Restored session for {}", session.username);
                SessionState::Authenticated(session)
            }
            Ok(None) => {
                tracing::info!("[Session] No persisted session");
                SessionState::Unauthenticated
            }
            Err(e) => {
                tracing::warn!("[Session] Failed to read persisted session: {}", e);
                SessionState::Unauthenticated
            }
        };
        self.state.send_replace(next.clone());
        next
    }

    /// Current state snapshot.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The active session, if authenticated.
    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// Returns the active session or an `Auth` error without touching the network.
    pub fn require_session(&self) -> Result<Session> {
        self.session()
            .ok_or_else(|| CeaError::auth(None, Some("Please log in first".to_string())))
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// A gate for `view` that follows this store's state.
    pub fn route_gate(&self, view: View) -> RouteGate {
        RouteGate::new(self.subscribe(), view)
    }

    /// Exchanges credentials for a session and persists it.
    ///
    /// On failure the state is left unchanged; use
    /// `err.user_message(LOGIN_FAILED)` for display.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CeaError::validation(CREDENTIALS_REQUIRED));
        }

        let _guard = self
            .auth_guard
            .try_lock()
            .map_err(|_| CeaError::Busy("login"))?;

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let current = self.session();
        let grant = match self.api.login(current.as_ref(), &credentials).await {
            Ok(grant) => grant,
            Err(e) => {
                tracing::warn!("[Session] Login rejected for {}: {}", email, e);
                return Err(e);
            }
        };

        let token = grant
            .access
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CeaError::auth(None, Some("No access token returned".to_string())))?;
        let username = grant
            .username
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| email.to_string());
        let session = Session::new(username, token);

        self.credentials.save(&session)?;
        self.state
            .send_replace(SessionState::Authenticated(session.clone()));
        tracing::info!("[Session] Logged in as {}", session.username);
        Ok(session)
    }

    /// Creates an account. Does not log in.
    ///
    /// A blank `username` is sent empty so the service derives one.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CeaError::validation(CREDENTIALS_REQUIRED));
        }

        let _guard = self
            .auth_guard
            .try_lock()
            .map_err(|_| CeaError::Busy("registration"))?;

        let registration = Registration {
            username: username.trim().to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        let current = self.session();
        match self.api.register(current.as_ref(), &registration).await {
            Ok(()) => {
                tracing::info!("[Session] Registered {}", email);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[Session] Registration rejected for {}: {}", email, e);
                Err(e)
            }
        }
    }

    /// Forgets the session locally and on disk.
    ///
    /// The state always ends `Unauthenticated`; a failure to delete the
    /// persisted credential is still reported.
    pub fn logout(&self) -> Result<()> {
        let cleared = self.credentials.clear();
        self.state.send_replace(SessionState::Unauthenticated);
        tracing::info!("[Session] Logged out");
        cleared
    }

    /// Drops a session the service no longer accepts.
    pub fn invalidate(&self) {
        if !self.state.borrow().is_authenticated() {
            return;
        }
        if let Err(e) = self.credentials.clear() {
            tracing::error!("[Session] Failed to clear rejected credential: {}", e);
        }
        self.state.send_replace(SessionState::Unauthenticated);
        tracing::warn!("[Session] Session rejected by service, logged out");
    }

    /// Invalidates the session when `err` is a 401 and hands the error back.
    pub fn observe_failure(&self, err: CeaError) -> CeaError {
        if err.is_unauthorized() {
            self.invalidate();
        }
        err
    }
}
