//! Recording commands.
//!
//! The webview owns the microphone (permission prompt and capture run in
//! the frontend); these commands hold the session-side contract — a
//! recording can only start with permission granted and only finish with
//! a real artifact URI.

use std::sync::Arc;

use tauri::State;

use crate::core_state::CoreState;
use crate::workflow::SessionView;

/// Begin a new recording attempt. Replaces whatever a previous attempt
/// left behind.
#[tauri::command]
pub fn start_recording(
    permission_granted: bool,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionView, String> {
    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    session
        .begin_recording(permission_granted)
        .map_err(|e| e.to_string())?;
    Ok(session.view())
}

/// Finalize the recording. The session moves to `uploading`; the
/// frontend follows up with `analyze_audio`.
#[tauri::command]
pub fn stop_recording(
    artifact_uri: Option<String>,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionView, String> {
    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    session
        .finish_recording(artifact_uri)
        .map_err(|e| e.to_string())?;
    Ok(session.view())
}
