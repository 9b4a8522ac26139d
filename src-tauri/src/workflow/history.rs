//! History presentation model and the parallel search sub-machine.
//!
//! History search is its own slot: it shares no state with the diagnosis
//! flow and neither blocks the other. The fetch normalizes the server's
//! record list into a date-sorted [`HistoryView`], counting (not hiding)
//! the records it had to drop.

use serde::Serialize;

use crate::backend::{ApiError, BackendApi};
use crate::models::prediction::PredictionRecord;
use crate::models::DisplayDiagnosis;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistoryError {
    /// HTTP 404 — a benign empty state, not a failure banner.
    #[error("No predictions found for patient \"{0}\"")]
    NotFound(String),
    #[error("History request timed out")]
    Timeout,
    #[error("Failed to load prediction history: {0}")]
    Fetch(String),
    #[error("A history search is already running")]
    Busy,
}

/// Normalized history: newest first, plus how many records were dropped
/// as malformed (missing date/risk, or an unparseable date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub entries: Vec<DisplayDiagnosis>,
    pub skipped: usize,
}

/// Project and sort a raw record list.
pub fn build_view(records: &[PredictionRecord]) -> HistoryView {
    let mut entries = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for (index, record) in records.iter().enumerate() {
        match DisplayDiagnosis::from_record(record) {
            Some(diagnosis) => entries.push(diagnosis),
            None => {
                skipped += 1;
                tracing::warn!(
                    index,
                    date = ?record.date,
                    risk = ?record.risk_level,
                    "dropping malformed history record"
                );
            }
        }
    }
    // Stable sort: same-day records keep their server order.
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    HistoryView { entries, skipped }
}

/// Fetch and normalize a patient's history.
pub fn fetch_history(api: &dyn BackendApi, patient_name: &str) -> Result<HistoryView, HistoryError> {
    let name = patient_name.trim();
    let records = api.patient_predictions(name).map_err(|e| match e {
        ApiError::Server { status: 404, .. } => HistoryError::NotFound(name.to_string()),
        e if e.is_timeout() => HistoryError::Timeout,
        e => HistoryError::Fetch(e.to_string()),
    })?;
    Ok(build_view(&records))
}

/// Resolved state of the history search sub-machine, as the UI sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HistoryPhase {
    Idle,
    Searching,
    Shown {
        entries: Vec<DisplayDiagnosis>,
        skipped: usize,
    },
    /// Benign: the patient simply has no predictions yet. No retry.
    Empty { message: String },
    /// Transport or server failure; the UI offers a retry.
    Failed { message: String, retryable: bool },
}

impl Default for HistoryPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Map a fetch result onto the sub-machine's terminal states.
pub fn resolve_outcome(patient_name: &str, result: Result<HistoryView, HistoryError>) -> HistoryPhase {
    match result {
        Ok(view) if view.entries.is_empty() => HistoryPhase::Empty {
            message: HistoryError::NotFound(patient_name.trim().to_string()).to_string(),
        },
        Ok(view) => HistoryPhase::Shown {
            entries: view.entries,
            skipped: view.skipped,
        },
        Err(e @ HistoryError::NotFound(_)) => HistoryPhase::Empty {
            message: e.to_string(),
        },
        Err(e) => HistoryPhase::Failed {
            message: e.to_string(),
            retryable: true,
        },
    }
}

/// The history search slot. Guards against a second search while one is
/// pending, and tracks a generation so a result fetched for a search
/// that was reset in the meantime (logout mid-flight) is dropped instead
/// of resurrecting discarded history.
#[derive(Debug, Default)]
pub struct HistorySlot {
    phase: HistoryPhase,
    generation: u64,
}

impl HistorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &HistoryPhase {
        &self.phase
    }

    /// Enter `Searching` and return the generation the eventual
    /// [`HistorySlot::resolve`] must present.
    pub fn begin_search(&mut self) -> Result<u64, HistoryError> {
        if self.phase == HistoryPhase::Searching {
            return Err(HistoryError::Busy);
        }
        self.generation += 1;
        self.phase = HistoryPhase::Searching;
        Ok(self.generation)
    }

    /// Store the outcome of the search started as `generation`. A stale
    /// generation means the slot was reset while the fetch was in flight;
    /// the result is dropped and `false` returned.
    pub fn resolve(&mut self, generation: u64, phase: HistoryPhase) -> bool {
        if generation != self.generation {
            tracing::warn!(
                stale = generation,
                current = self.generation,
                "dropping history result for a reset search"
            );
            return false;
        }
        self.phase = phase;
        true
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = HistoryPhase::Idle;
    }
}
