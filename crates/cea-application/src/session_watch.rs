use cea_core::session::SessionState;
use tokio::sync::watch;

/// Tracks session transitions for a store holding session-scoped data.
pub(crate) struct SessionWatch {
    receiver: watch::Receiver<SessionState>,
}

impl SessionWatch {
    pub(crate) fn new(receiver: watch::Receiver<SessionState>) -> Self {
        Self { receiver }
    }

    /// Returns true once per session transition since the last call.
    ///
    /// A closed channel counts as a transition.
    pub(crate) fn transitioned(&mut self) -> bool {
        let changed = self.receiver.has_changed().unwrap_or(true);
        if changed {
            let _ = self.receiver.borrow_and_update();
        }
        changed
    }
}
