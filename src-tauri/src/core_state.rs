//! Shared application state.
//!
//! One `CoreState` lives in an `Arc` managed by Tauri. Each logical slot
//! of the workflow gets its own lock: the auth session behind an
//! `RwLock` (read-mostly), the diagnosis session and the history search
//! behind separate `Mutex`es so the two flows never block each other.

use std::sync::{Mutex, MutexGuard, RwLock};

use crate::auth::{self, Role, SessionState};
use crate::backend::{BackendApi, HttpBackend};
use crate::workflow::history::HistorySlot;
use crate::workflow::DiagnosisSession;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
}

pub struct CoreState {
    backend: Box<dyn BackendApi>,
    session: RwLock<SessionState>,
    diagnosis: Mutex<DiagnosisSession>,
    history: Mutex<HistorySlot>,
}

impl CoreState {
    /// State wired to the real backend at the configured base URL.
    pub fn new() -> Self {
        Self::with_backend(Box::new(HttpBackend::from_env()))
    }

    /// State over an arbitrary backend (tests inject a mock here).
    pub fn with_backend(backend: Box<dyn BackendApi>) -> Self {
        Self {
            backend,
            session: RwLock::new(auth::logout()),
            diagnosis: Mutex::new(DiagnosisSession::new()),
            history: Mutex::new(HistorySlot::new()),
        }
    }

    pub fn backend(&self) -> &dyn BackendApi {
        self.backend.as_ref()
    }

    // ── Auth session ────────────────────────────────────────

    pub fn session(&self) -> Result<SessionState, CoreError> {
        self.session
            .read()
            .map(|s| s.clone())
            .map_err(|_| CoreError::LockPoisoned)
    }

    pub fn login(&self, role: Role, identity: String) -> Result<SessionState, CoreError> {
        let mut session = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
        *session = auth::login(role, identity);
        tracing::info!(role = role.as_str(), "logged in");
        Ok(session.clone())
    }

    /// Log out and discard every unpersisted slot: the in-flight
    /// diagnosis session and the resolved history search.
    pub fn logout(&self) -> Result<SessionState, CoreError> {
        let mut session = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
        *session = auth::logout();
        self.diagnosis()?.reset();
        self.history()?.reset();
        tracing::info!("logged out; session state discarded");
        Ok(session.clone())
    }

    // ── Workflow slots ──────────────────────────────────────

    pub fn diagnosis(&self) -> Result<MutexGuard<'_, DiagnosisSession>, CoreError> {
        self.diagnosis.lock().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn history(&self) -> Result<MutexGuard<'_, HistorySlot>, CoreError> {
        self.history.lock().map_err(|_| CoreError::LockPoisoned)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::workflow::DiagnosisPhase;

    fn state() -> CoreState {
        CoreState::with_backend(Box::new(MockBackend::new()))
    }

    #[test]
    fn starts_logged_out_and_idle() {
        let state = state();
        assert!(!state.session().unwrap().is_logged_in());
        assert_eq!(state.diagnosis().unwrap().phase(), DiagnosisPhase::Idle);
    }

    #[test]
    fn login_transition_is_visible() {
        let state = state();
        let session = state.login(Role::Doctor, "Dr. Grey".into()).unwrap();
        assert!(session.is_logged_in());
        assert_eq!(state.session().unwrap().identity(), Some("Dr. Grey"));
    }

    #[test]
    fn logout_discards_the_diagnosis_session() {
        let state = state();
        state.login(Role::Doctor, "Dr. Grey".into()).unwrap();
        state.diagnosis().unwrap().begin_recording(true).unwrap();

        let session = state.logout().unwrap();
        assert!(!session.is_logged_in());
        assert_eq!(state.diagnosis().unwrap().phase(), DiagnosisPhase::Idle);
    }

    #[test]
    fn history_and_diagnosis_slots_are_independent() {
        let state = state();
        state.diagnosis().unwrap().begin_recording(true).unwrap();
        // A history search proceeds while a recording is active.
        assert!(state.history().unwrap().begin_search().is_ok());
    }
}
