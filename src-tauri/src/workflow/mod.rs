//! Diagnosis-session workflow.
//!
//! One [`DiagnosisSession`] per recording/analysis attempt, driven through
//! an explicit phase machine:
//!
//! ```text
//! Idle → Recording → Uploading → Extracted ⇄ Editing
//!                                Extracted → Analyzing → Complete
//! ```
//!
//! Any phase returns to `Idle` via [`DiagnosisSession::reset`] (logout
//! included), discarding all unpersisted state. Illegal transitions are
//! [`PhaseError`]s — this is what enforces the one-action-per-slot rule:
//! while an upload is pending the session sits in `Uploading` and a second
//! upload cannot start.

pub mod history;
pub mod predict;

use serde::Serialize;
use uuid::Uuid;

use crate::capture::{CaptureController, CaptureError};
use crate::models::extraction::ExtractionResult;
use crate::models::features::{FeatureDraft, FeatureField};
use crate::reconcile::{EditError, FeatureStore};

/// Where the current diagnosis attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisPhase {
    Idle,
    Recording,
    Uploading,
    Extracted,
    Editing,
    Analyzing,
    Complete,
}

impl DiagnosisPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Uploading => "uploading",
            Self::Extracted => "extracted",
            Self::Editing => "editing",
            Self::Analyzing => "analyzing",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for DiagnosisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action was attempted in a phase that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot {action} while the session is {phase}")]
pub struct PhaseError {
    pub action: &'static str,
    pub phase: DiagnosisPhase,
}

/// Any failure of a session operation, unified for the command boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Snapshot of the session for the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub phase: DiagnosisPhase,
    pub audio_ref: Option<String>,
    pub extraction: Option<ExtractionResult>,
    pub features: FeatureDraft,
    pub editing: bool,
}

/// Ephemeral state of one recording/analysis attempt.
#[derive(Debug)]
pub struct DiagnosisSession {
    id: Uuid,
    phase: DiagnosisPhase,
    capture: CaptureController,
    audio_ref: Option<String>,
    extraction: Option<ExtractionResult>,
    features: FeatureStore,
}

impl Default for DiagnosisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosisSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: DiagnosisPhase::Idle,
            capture: CaptureController::new(),
            audio_ref: None,
            extraction: None,
            features: FeatureStore::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> DiagnosisPhase {
        self.phase
    }

    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    pub fn canonical_features(&self) -> &FeatureDraft {
        self.features.canonical()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            phase: self.phase,
            audio_ref: self.audio_ref.clone(),
            extraction: self.extraction.clone(),
            features: self.features.visible().clone(),
            editing: self.features.is_editing(),
        }
    }

    /// Discard everything and return to `Idle`. Used on logout and when
    /// the screen unmounts.
    pub fn reset(&mut self) {
        tracing::debug!(session = %self.id, "diagnosis session reset");
        *self = Self::new();
    }

    fn guard(&self, action: &'static str, allowed: &[DiagnosisPhase]) -> Result<(), PhaseError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(PhaseError {
                action,
                phase: self.phase,
            })
        }
    }

    // ── Recording slot ──────────────────────────────────────

    /// Start a new recording attempt. A fresh session replaces whatever
    /// an earlier attempt left behind.
    pub fn begin_recording(&mut self, permission_granted: bool) -> Result<(), SessionError> {
        use DiagnosisPhase::*;
        self.guard("start recording", &[Idle, Extracted, Complete])?;
        *self = Self::new();
        self.capture.start(permission_granted)?;
        self.phase = Recording;
        tracing::info!(session = %self.id, "recording started");
        Ok(())
    }

    /// Finalize the recording; the artifact moves from capture to the
    /// upload slot and the session enters `Uploading`.
    pub fn finish_recording(&mut self, artifact: Option<String>) -> Result<String, SessionError> {
        self.guard("stop recording", &[DiagnosisPhase::Recording])?;
        let uri = self.capture.stop(artifact).map_err(|e| {
            // A failed finalization abandons the attempt entirely.
            self.phase = DiagnosisPhase::Idle;
            e
        })?;
        self.audio_ref = Some(uri.clone());
        self.phase = DiagnosisPhase::Uploading;
        tracing::info!(session = %self.id, uri = %uri, "recording finalized");
        Ok(uri)
    }

    // ── Upload slot ─────────────────────────────────────────

    /// The URI the upload should use; only valid while `Uploading`.
    pub fn upload_artifact(&self) -> Result<String, SessionError> {
        self.guard("upload audio", &[DiagnosisPhase::Uploading])?;
        self.audio_ref.clone().map(Ok).unwrap_or_else(|| {
            Err(SessionError::Capture(CaptureError::ArtifactUnavailable))
        })
    }

    /// Enter `Uploading` for a raw-text analysis (no artifact involved).
    pub fn begin_text_analysis(&mut self) -> Result<(), SessionError> {
        use DiagnosisPhase::*;
        self.guard("analyze text", &[Idle, Extracted, Complete])?;
        *self = Self::new();
        self.phase = Uploading;
        Ok(())
    }

    /// Extraction arrived: replaces any prior extraction (last write
    /// wins) and rebuilds the canonical feature draft from it.
    pub fn complete_extraction(&mut self, extraction: ExtractionResult) -> Result<(), SessionError> {
        self.guard("store extraction", &[DiagnosisPhase::Uploading])?;
        self.features.replace_canonical(extraction.to_draft());
        self.extraction = Some(extraction);
        self.phase = DiagnosisPhase::Extracted;
        tracing::info!(session = %self.id, fields = self.features.canonical().len(), "extraction stored");
        Ok(())
    }

    /// Upload failed; the user re-triggers manually, nothing retries.
    pub fn fail_upload(&mut self) -> Result<(), SessionError> {
        self.guard("abandon upload", &[DiagnosisPhase::Uploading])?;
        self.audio_ref = None;
        self.phase = DiagnosisPhase::Idle;
        Ok(())
    }

    // ── Edit sub-flow ───────────────────────────────────────

    pub fn begin_edit(&mut self) -> Result<(), SessionError> {
        self.guard("edit features", &[DiagnosisPhase::Extracted])?;
        self.features.begin_edit()?;
        self.phase = DiagnosisPhase::Editing;
        Ok(())
    }

    pub fn update_field(&mut self, field: FeatureField, value: &str) -> Result<(), SessionError> {
        self.guard("update a field", &[DiagnosisPhase::Editing])?;
        self.features.update_field(field, value)?;
        Ok(())
    }

    pub fn commit_edit(&mut self) -> Result<(), SessionError> {
        self.guard("commit the edit", &[DiagnosisPhase::Editing])?;
        self.features.commit_edit()?;
        self.phase = DiagnosisPhase::Extracted;
        Ok(())
    }

    pub fn cancel_edit(&mut self) -> Result<(), SessionError> {
        self.guard("cancel the edit", &[DiagnosisPhase::Editing])?;
        self.features.cancel_edit()?;
        self.phase = DiagnosisPhase::Extracted;
        Ok(())
    }

    // ── Analysis slot ───────────────────────────────────────

    /// Enter `Analyzing`. Reachable from `Extracted` (reconciled
    /// extraction) and from `Idle`/`Complete` (manual form submissions).
    pub fn begin_analysis(&mut self) -> Result<(), SessionError> {
        use DiagnosisPhase::*;
        self.guard("submit a prediction", &[Extracted, Idle, Complete])?;
        self.phase = Analyzing;
        Ok(())
    }

    pub fn complete_analysis(&mut self) -> Result<(), SessionError> {
        self.guard("finish the analysis", &[DiagnosisPhase::Analyzing])?;
        self.phase = DiagnosisPhase::Complete;
        Ok(())
    }

    /// Analysis failed; fall back to where the data still lives.
    pub fn fail_analysis(&mut self) -> Result<(), SessionError> {
        self.guard("abandon the analysis", &[DiagnosisPhase::Analyzing])?;
        self.phase = if self.extraction.is_some() {
            DiagnosisPhase::Extracted
        } else {
            DiagnosisPhase::Idle
        };
        Ok(())
    }
}
