//! Diagnosis commands: extraction, feature editing, prediction, reset.
//!
//! Network-bound commands follow one shape: take the diagnosis lock,
//! transition the phase machine, remember the session id, release the
//! lock for the blocking request, then re-take it to store the outcome.
//! If the session was reset while the request was in flight the stale
//! result is dropped with a warning instead of resurrecting a session
//! the user already abandoned.

use std::collections::BTreeMap;
use std::sync::Arc;

use tauri::State;

use crate::backend::ApiError;
use crate::core_state::CoreState;
use crate::models::extraction::ExtractionResult;
use crate::models::features::{FeatureDraft, FeatureField};
use crate::models::DisplayDiagnosis;
use crate::workflow::predict;
use crate::workflow::SessionView;

const SESSION_RESET_IN_FLIGHT: &str = "The session was reset while the request was running";

/// Upload the finalized recording for transcription and extraction.
#[tauri::command]
pub fn analyze_audio(state: State<'_, Arc<CoreState>>) -> Result<SessionView, String> {
    run_audio_analysis(state.inner())
}

/// Submit raw text (typed or pasted) for extraction instead of audio.
#[tauri::command]
pub fn analyze_text(
    text: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionView, String> {
    run_text_analysis(state.inner(), &text)
}

/// Open the feature-edit overlay on a scratch copy of the draft.
#[tauri::command]
pub fn begin_feature_edit(state: State<'_, Arc<CoreState>>) -> Result<SessionView, String> {
    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    session.begin_edit().map_err(|e| e.to_string())?;
    Ok(session.view())
}

/// Change one field of the scratch copy. The canonical draft is
/// untouched until `commit_feature_edit`.
#[tauri::command]
pub fn update_feature_field(
    field: String,
    value: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionView, String> {
    let field =
        FeatureField::match_key(&field).ok_or_else(|| format!("Unknown feature field '{field}'"))?;
    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    session
        .update_field(field, &value)
        .map_err(|e| e.to_string())?;
    Ok(session.view())
}

/// Promote the scratch copy to canonical.
#[tauri::command]
pub fn commit_feature_edit(state: State<'_, Arc<CoreState>>) -> Result<SessionView, String> {
    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    session.commit_edit().map_err(|e| e.to_string())?;
    Ok(session.view())
}

/// Discard the scratch copy; the canonical draft survives unchanged.
#[tauri::command]
pub fn cancel_feature_edit(state: State<'_, Arc<CoreState>>) -> Result<SessionView, String> {
    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    session.cancel_edit().map_err(|e| e.to_string())?;
    Ok(session.view())
}

/// Snapshot of the session for the frontend, including the visible
/// feature draft.
#[tauri::command]
pub fn get_feature_draft(state: State<'_, Arc<CoreState>>) -> Result<SessionView, String> {
    let session = state.diagnosis().map_err(|e| e.to_string())?;
    Ok(session.view())
}

/// Submit the feature draft for a risk prediction and return the
/// authoritative persisted record. `manual` carries form input when the
/// user bypasses extraction entirely; otherwise the reconciled canonical
/// draft is submitted.
#[tauri::command]
pub fn submit_prediction(
    patient_name: String,
    manual: Option<BTreeMap<String, String>>,
    state: State<'_, Arc<CoreState>>,
) -> Result<DisplayDiagnosis, String> {
    run_prediction(state.inner(), &patient_name, manual)
}

/// Drop the whole diagnosis session and return to idle.
#[tauri::command]
pub fn reset_diagnosis(state: State<'_, Arc<CoreState>>) -> Result<SessionView, String> {
    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    session.reset();
    Ok(session.view())
}

fn run_audio_analysis(state: &CoreState) -> Result<SessionView, String> {
    let (session_id, uri) = {
        let session = state.diagnosis().map_err(|e| e.to_string())?;
        let uri = session.upload_artifact().map_err(|e| e.to_string())?;
        (session.id(), uri)
    };

    let result = state.backend().analyze_audio(&uri);
    store_extraction(state, session_id, result)
}

fn run_text_analysis(state: &CoreState, text: &str) -> Result<SessionView, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Please enter some text to analyze.".to_string());
    }

    let session_id = {
        let mut session = state.diagnosis().map_err(|e| e.to_string())?;
        session.begin_text_analysis().map_err(|e| e.to_string())?;
        session.id()
    };

    let result = state.backend().analyze_text(text);
    store_extraction(state, session_id, result)
}

/// Re-take the lock after a network round trip and store the extraction
/// (or abandon the upload).
fn store_extraction(
    state: &CoreState,
    session_id: uuid::Uuid,
    result: Result<ExtractionResult, ApiError>,
) -> Result<SessionView, String> {
    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    if session.id() != session_id {
        tracing::warn!(
            stale = %session_id,
            current = %session.id(),
            "dropping extraction result for a reset session"
        );
        return Err(SESSION_RESET_IN_FLIGHT.to_string());
    }

    match result {
        Ok(extraction) => {
            session
                .complete_extraction(extraction)
                .map_err(|e| e.to_string())?;
            Ok(session.view())
        }
        Err(e) => {
            if let Err(inner) = session.fail_upload() {
                tracing::warn!(error = %inner, "could not abandon the upload");
            }
            Err(e.to_string())
        }
    }
}

fn run_prediction(
    state: &CoreState,
    patient_name: &str,
    manual: Option<BTreeMap<String, String>>,
) -> Result<DisplayDiagnosis, String> {
    let (session_id, draft) = {
        let mut session = state.diagnosis().map_err(|e| e.to_string())?;
        let draft = match &manual {
            Some(fields) => {
                FeatureDraft::from_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                    .map_err(|e| e.to_string())?
            }
            None => session.canonical_features().clone(),
        };
        session.begin_analysis().map_err(|e| e.to_string())?;
        (session.id(), draft)
    };

    let result = predict::submit_prediction(state.backend(), patient_name, &draft);

    let mut session = state.diagnosis().map_err(|e| e.to_string())?;
    if session.id() != session_id {
        tracing::warn!(
            stale = %session_id,
            current = %session.id(),
            "dropping prediction result for a reset session"
        );
        return Err(SESSION_RESET_IN_FLIGHT.to_string());
    }

    match result {
        Ok(diagnosis) => {
            session.complete_analysis().map_err(|e| e.to_string())?;
            Ok(diagnosis)
        }
        Err(e) => {
            if let Err(inner) = session.fail_analysis() {
                tracing::warn!(error = %inner, "could not abandon the analysis");
            }
            Err(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::models::prediction::PredictionRecord;
    use crate::workflow::DiagnosisPhase;
    use serde_json::json;

    fn extraction() -> ExtractionResult {
        serde_json::from_str(r#"{"features_extracted": {"Age": 45, "Sex": "M"}}"#).unwrap()
    }

    fn record() -> PredictionRecord {
        PredictionRecord {
            date: Some("2026-08-27".to_string()),
            risk_level: Some("High".to_string()),
            probability: Some(0.82),
            input_data: json!({"Age": 45}).as_object().unwrap().clone(),
        }
    }

    fn manual_fields() -> BTreeMap<String, String> {
        crate::models::features::complete_draft()
            .iter()
            .map(|(f, v)| (f.wire_name().to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn recorded_audio_flows_through_analysis() {
        let state = CoreState::with_backend(Box::new(
            MockBackend::new().with_extraction(extraction()),
        ));
        {
            let mut session = state.diagnosis().unwrap();
            session.begin_recording(true).unwrap();
            session
                .finish_recording(Some("file:///tmp/rec1.m4a".into()))
                .unwrap();
        }

        let view = run_audio_analysis(&state).unwrap();
        assert_eq!(view.phase, DiagnosisPhase::Extracted);
        assert_eq!(view.audio_ref.as_deref(), Some("file:///tmp/rec1.m4a"));
        assert_eq!(view.features.get(FeatureField::Age), Some("45"));
    }

    #[test]
    fn audio_analysis_requires_a_finalized_recording() {
        let state = CoreState::with_backend(Box::new(MockBackend::new()));
        assert!(run_audio_analysis(&state).is_err());
        assert_eq!(state.diagnosis().unwrap().phase(), DiagnosisPhase::Idle);
    }

    #[test]
    fn text_analysis_lands_in_extracted() {
        let state = CoreState::with_backend(Box::new(
            MockBackend::new().with_extraction(extraction()),
        ));
        let view = run_text_analysis(&state, "chest pain since yesterday").unwrap();
        assert_eq!(view.phase, DiagnosisPhase::Extracted);
        assert_eq!(view.features.get(FeatureField::Age), Some("45"));
    }

    #[test]
    fn empty_text_is_rejected_before_any_request() {
        let state = CoreState::with_backend(Box::new(MockBackend::new()));
        let err = run_text_analysis(&state, "   ").unwrap_err();
        assert_eq!(err, "Please enter some text to analyze.");
        assert_eq!(state.diagnosis().unwrap().phase(), DiagnosisPhase::Idle);
    }

    #[test]
    fn failed_extraction_abandons_the_upload() {
        let state = CoreState::with_backend(Box::new(
            MockBackend::new().with_extraction_error(ApiError::Timeout(180)),
        ));
        let err = run_text_analysis(&state, "chest pain").unwrap_err();
        assert!(err.contains("timed out"));
        assert_eq!(state.diagnosis().unwrap().phase(), DiagnosisPhase::Idle);
    }

    #[test]
    fn stale_extraction_result_is_dropped_after_reset() {
        let state = CoreState::with_backend(Box::new(MockBackend::new()));
        let old_id = {
            let mut session = state.diagnosis().unwrap();
            session.begin_text_analysis().unwrap();
            session.id()
        };
        state.diagnosis().unwrap().reset();

        let err = store_extraction(&state, old_id, Ok(extraction())).unwrap_err();
        assert_eq!(err, SESSION_RESET_IN_FLIGHT);
        assert_eq!(state.diagnosis().unwrap().phase(), DiagnosisPhase::Idle);
    }

    #[test]
    fn manual_prediction_completes_the_session() {
        let state = CoreState::with_backend(Box::new(
            MockBackend::new().with_history(vec![record()]),
        ));
        let diagnosis = run_prediction(&state, "John Doe", Some(manual_fields())).unwrap();
        assert_eq!(diagnosis.date, "2026-08-27");
        assert_eq!(state.diagnosis().unwrap().phase(), DiagnosisPhase::Complete);
    }

    #[test]
    fn reconciled_draft_is_submitted_when_no_manual_input() {
        let state = CoreState::with_backend(Box::new(
            MockBackend::new()
                .with_extraction(
                    serde_json::from_str(
                        r#"{"features_extracted": {
                            "Age": 45, "Sex": "M", "ChestPainType": "ATA",
                            "RestingBP": 140, "Cholesterol": 289, "FastingBS": 0,
                            "RestingECG": "Normal", "MaxHR": 172,
                            "ExerciseAngina": "N", "Oldpeak": 0.5, "ST_Slope": "Up"
                        }}"#,
                    )
                    .unwrap(),
                )
                .with_history(vec![record()]),
        ));
        run_text_analysis(&state, "chest pain").unwrap();

        let diagnosis = run_prediction(&state, "John Doe", None).unwrap();
        assert_eq!(diagnosis.prediction_line, "Risk: High (82% probability)");
    }

    #[test]
    fn failed_prediction_falls_back_to_extracted() {
        let state = CoreState::with_backend(Box::new(
            MockBackend::new()
                .with_extraction(extraction())
                .with_predict_error(ApiError::Server {
                    status: 500,
                    body: "boom".into(),
                }),
        ));
        run_text_analysis(&state, "chest pain").unwrap();
        // Incomplete draft: validation fails before the wire, but the
        // phase fallback is the same as for a server failure.
        assert!(run_prediction(&state, "John Doe", None).is_err());
        assert_eq!(state.diagnosis().unwrap().phase(), DiagnosisPhase::Extracted);
    }

    #[test]
    fn unknown_field_name_is_rejected() {
        assert!(FeatureField::match_key("HeartRateVariability").is_none());
    }
}
