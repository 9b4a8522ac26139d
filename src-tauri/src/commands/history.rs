//! History search command.
//!
//! Runs in its own slot, parallel to the diagnosis flow. Fetch failures
//! resolve into a `failed` phase the UI renders (with a retry button
//! where it makes sense) rather than an IPC error; only lock poisoning
//! and a still-pending search surface as errors.

use std::sync::Arc;

use tauri::State;

use crate::core_state::CoreState;
use crate::workflow::history::{self, HistoryPhase};

/// Look up a patient's prediction history and resolve the search slot.
#[tauri::command]
pub fn search_patient_history(
    patient_name: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<HistoryPhase, String> {
    run_search(state.inner(), &patient_name)
}

const SEARCH_RESET_IN_FLIGHT: &str = "The session was reset while the search was running";

fn run_search(state: &CoreState, patient_name: &str) -> Result<HistoryPhase, String> {
    let name = patient_name.trim();
    if name.is_empty() {
        return Err("Please enter a patient name.".to_string());
    }

    let generation = state
        .history()
        .map_err(|e| e.to_string())?
        .begin_search()
        .map_err(|e| e.to_string())?;

    let result = history::fetch_history(state.backend(), name);
    let phase = history::resolve_outcome(name, result);

    let mut slot = state.history().map_err(|e| e.to_string())?;
    if !slot.resolve(generation, phase.clone()) {
        return Err(SEARCH_RESET_IN_FLIGHT.to_string());
    }
    Ok(phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ApiError, MockBackend};
    use crate::models::prediction::PredictionRecord;
    use serde_json::json;

    fn record(date: &str) -> PredictionRecord {
        PredictionRecord {
            date: Some(date.to_string()),
            risk_level: Some("High".to_string()),
            probability: Some(0.82),
            input_data: json!({"Age": 45}).as_object().unwrap().clone(),
        }
    }

    #[test]
    fn successful_search_resolves_to_shown() {
        let state = CoreState::with_backend(Box::new(
            MockBackend::new().with_history(vec![record("2026-08-27"), record("2024-03-10")]),
        ));
        let phase = run_search(&state, " John Doe ").unwrap();
        match &phase {
            HistoryPhase::Shown { entries, skipped } => {
                assert_eq!(entries.len(), 2);
                assert_eq!(*skipped, 0);
            }
            other => panic!("expected shown, got {other:?}"),
        }
        assert_eq!(state.history().unwrap().phase(), &phase);
    }

    #[test]
    fn missing_patient_resolves_to_empty() {
        let state = CoreState::with_backend(Box::new(MockBackend::new().with_history_error(
            ApiError::Server {
                status: 404,
                body: "no such patient".into(),
            },
        )));
        let phase = run_search(&state, "unknown").unwrap();
        assert_eq!(
            phase,
            HistoryPhase::Empty {
                message: "No predictions found for patient \"unknown\"".to_string(),
            }
        );
    }

    #[test]
    fn server_failure_resolves_to_retryable_failed() {
        let state = CoreState::with_backend(Box::new(
            MockBackend::new().with_history_error(ApiError::Timeout(60)),
        ));
        let phase = run_search(&state, "John Doe").unwrap();
        assert!(matches!(
            phase,
            HistoryPhase::Failed { retryable: true, .. }
        ));
    }

    #[test]
    fn logout_during_search_discards_the_late_result() {
        // Same interleaving as run_search with a logout between the fetch
        // and the resolve: begin, session ends, late result arrives.
        let state = CoreState::with_backend(Box::new(
            MockBackend::new().with_history(vec![record("2026-08-27")]),
        ));
        let generation = state.history().unwrap().begin_search().unwrap();
        let result = history::fetch_history(state.backend(), "John Doe");
        let late = history::resolve_outcome("John Doe", result);

        state.logout().unwrap();

        assert!(!state.history().unwrap().resolve(generation, late));
        assert_eq!(state.history().unwrap().phase(), &HistoryPhase::Idle);
    }

    #[test]
    fn blank_name_is_rejected_before_the_search_starts() {
        let state = CoreState::with_backend(Box::new(MockBackend::new()));
        let err = run_search(&state, "   ").unwrap_err();
        assert_eq!(err, "Please enter a patient name.");
        assert_eq!(state.history().unwrap().phase(), &HistoryPhase::Idle);
    }
}
