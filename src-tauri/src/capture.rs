//! Recording capture — single-recording lifecycle and artifact hand-off.
//!
//! Microphone hardware lives in the UI layer (the webview recorder). This
//! controller owns the contract around it: the UI reports the permission
//! grant to [`CaptureController::start`] and hands the finalized artifact
//! URI to [`CaptureController::stop`]; the controller enforces permission
//! denial, at-most-one active recording, and artifact availability. The
//! artifact reference belongs to capture until `stop` hands it to the
//! upload step.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Microphone permission is required to record audio")]
    PermissionDenied,
    #[error("No finished recording artifact is available")]
    ArtifactUnavailable,
    #[error("A recording is already in progress")]
    AlreadyRecording,
}

/// Recording lifecycle state, as shown to the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Owner of the single recording slot.
#[derive(Debug, Default)]
pub struct CaptureController {
    active: bool,
}

impl CaptureController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a recording. `permission_granted` is the result of the UI's
    /// microphone permission request; a refused grant fails here and the
    /// recording never starts.
    pub fn start(&mut self, permission_granted: bool) -> Result<(), CaptureError> {
        if self.active {
            return Err(CaptureError::AlreadyRecording);
        }
        if !permission_granted {
            return Err(CaptureError::PermissionDenied);
        }
        self.active = true;
        Ok(())
    }

    /// Finalize the active recording, taking ownership of the artifact
    /// URI produced by the recorder. Fails if no recording is active or
    /// if finalization yielded no URI.
    pub fn stop(&mut self, artifact: Option<String>) -> Result<String, CaptureError> {
        if !self.active {
            return Err(CaptureError::ArtifactUnavailable);
        }
        self.active = false;
        match artifact.map(|u| u.trim().to_string()) {
            Some(uri) if !uri.is_empty() => Ok(uri),
            _ => Err(CaptureError::ArtifactUnavailable),
        }
    }

    /// Abandon any active recording without producing an artifact.
    pub fn reset(&mut self) {
        self.active = false;
    }

    pub fn state(&self) -> RecordingState {
        if self.active {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }
}
