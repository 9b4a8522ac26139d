//! Auth commands: login, register, logout, session query.
//!
//! Empty fields are rejected locally with the exact messages the UI
//! shows, before any network traffic. The signed-in identity is the name
//! the backend echoed back, falling back to the entered name when the
//! reply carries none.

use std::str::FromStr;
use std::sync::Arc;

use tauri::State;

use crate::auth::{Role, SessionState};
use crate::core_state::CoreState;

const MISSING_CREDENTIALS: &str = "Please enter both name and password.";

fn validated(role: &str, name: &str, password: &str) -> Result<(Role, String, String), String> {
    let role = Role::from_str(role)?;
    let name = name.trim();
    let password = password.trim();
    if name.is_empty() || password.is_empty() {
        return Err(MISSING_CREDENTIALS.to_string());
    }
    Ok((role, name.to_string(), password.to_string()))
}

/// Sign in against `/api/{role}/login` and store the session.
#[tauri::command]
pub fn login(
    role: String,
    name: String,
    password: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionState, String> {
    let (role, name, password) = validated(&role, &name, &password)?;

    let reply = state
        .backend()
        .login(role, &name, &password)
        .map_err(|e| e.to_string())?;

    let identity = reply.name.unwrap_or(name);
    state.login(role, identity).map_err(|e| e.to_string())
}

/// Create an account against `/api/{role}/register`. Does not sign in;
/// the frontend routes back to the login form.
#[tauri::command]
pub fn register(
    role: String,
    name: String,
    password: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<(), String> {
    let (role, name, password) = validated(&role, &name, &password)?;

    state
        .backend()
        .register(role, &name, &password)
        .map_err(|e| e.to_string())
}

/// Sign out and discard all in-flight session state.
#[tauri::command]
pub fn logout(state: State<'_, Arc<CoreState>>) -> Result<SessionState, String> {
    state.logout().map_err(|e| e.to_string())
}

/// Current auth state, for the frontend to route on at startup.
#[tauri::command]
pub fn current_session(state: State<'_, Arc<CoreState>>) -> Result<SessionState, String> {
    state.session().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_rejected_locally() {
        let err = validated("doctor", "  ", "pw").unwrap_err();
        assert_eq!(err, MISSING_CREDENTIALS);
        let err = validated("patient", "John Doe", "").unwrap_err();
        assert_eq!(err, MISSING_CREDENTIALS);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = validated("nurse", "John Doe", "pw").unwrap_err();
        assert!(err.contains("nurse"));
    }

    #[test]
    fn valid_input_is_trimmed() {
        let (role, name, password) = validated("Doctor", " Dr. Grey ", " pw ").unwrap();
        assert_eq!(role, Role::Doctor);
        assert_eq!(name, "Dr. Grey");
        assert_eq!(password, "pw");
    }
}
