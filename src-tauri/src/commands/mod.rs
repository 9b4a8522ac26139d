//! IPC command surface.
//!
//! Every command is a thin synchronous wrapper: take the relevant lock,
//! drive a state-machine transition, and translate the typed error into
//! the `String` the frontend displays. Commands that talk to the backend
//! release the lock for the duration of the network call and re-take it
//! to store the outcome, so a busy upload never blocks the rest of the
//! app.

pub mod auth;
pub mod diagnosis;
pub mod history;
pub mod recording;

/// Health check IPC command — verifies backend is running
#[tauri::command]
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_returns_ok() {
        assert_eq!(health_check(), "ok");
    }
}
