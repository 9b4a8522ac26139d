//! Prediction submission workflow.
//!
//! Validate locally, submit, then re-fetch the patient's persisted
//! history and display its most recent record. The synchronous predict
//! response is only an acknowledgement — risk label, probability, and
//! date normalization are authoritative in the persisted record, so the
//! immediate payload is discarded.

use crate::backend::BackendApi;
use crate::models::diagnosis::normalize_date;
use crate::models::features::{FeatureDraft, ValidationError};
use crate::models::prediction::PredictionRecord;
use crate::models::DisplayDiagnosis;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Prediction submission failed: {0}")]
    Submission(String),
    #[error("Prediction saved, but the result could not be confirmed: {0}")]
    Confirmation(String),
    #[error("No record found for patient \"{0}\" after a successful submission")]
    NoRecordFound(String),
}

/// Submit a feature draft for `patient_name` and return the authoritative
/// display record.
///
/// Validation happens before any network traffic; a draft with a missing
/// or malformed field fails with [`PredictError::Validation`] and the
/// backend never sees the request.
pub fn submit_prediction(
    api: &dyn BackendApi,
    patient_name: &str,
    draft: &FeatureDraft,
) -> Result<DisplayDiagnosis, PredictError> {
    let name = patient_name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("patientName", "value is empty").into());
    }
    let snapshot = draft.finalize()?;

    let results = api
        .predict(name, &snapshot)
        .map_err(|e| PredictError::Submission(e.to_string()))?;
    let Some(ack) = results.first() else {
        return Err(PredictError::Submission(
            "server returned no prediction result".to_string(),
        ));
    };
    tracing::info!(
        patient = name,
        risk = %ack.risk_level,
        "prediction acknowledged; fetching authoritative record"
    );

    let records = api
        .patient_predictions(name)
        .map_err(|e| PredictError::Confirmation(e.to_string()))?;

    latest_record(&records)
        .and_then(DisplayDiagnosis::from_record)
        .ok_or_else(|| PredictError::NoRecordFound(name.to_string()))
}

/// The most recent record by parsed date. Records whose date does not
/// parse cannot be "most recent". Ties on the date go to the record that
/// appears first in server order — a deterministic, stable choice.
pub fn latest_record(records: &[PredictionRecord]) -> Option<&PredictionRecord> {
    let mut best: Option<(&PredictionRecord, String)> = None;
    for record in records {
        let Some(date) = record.date.as_deref().and_then(normalize_date) else {
            continue;
        };
        match &best {
            Some((_, current)) if *current >= date => {}
            _ => best = Some((record, date)),
        }
    }
    best.map(|(record, _)| record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ApiError, MockBackend};
    use crate::models::features::{complete_draft, FeatureDraft, FeatureField};
    use crate::models::prediction::RiskResult;
    use serde_json::json;

    fn record(date: &str, risk: &str) -> PredictionRecord {
        PredictionRecord {
            date: Some(date.to_string()),
            risk_level: Some(risk.to_string()),
            probability: Some(0.82),
            input_data: json!({"Age": 45}).as_object().unwrap().clone(),
        }
    }

    #[test]
    fn valid_draft_never_fails_validation() {
        let api = MockBackend::new().with_history(vec![record("2026-08-27", "High")]);
        let result = submit_prediction(&api, "John Doe", &complete_draft());
        assert!(!matches!(result, Err(PredictError::Validation(_))));
    }

    #[test]
    fn incomplete_draft_makes_no_network_call() {
        let api = MockBackend::new();
        let mut draft = FeatureDraft::new();
        for (field, value) in complete_draft().iter() {
            if field != FeatureField::RestingBp {
                draft.set(field, value).unwrap();
            }
        }

        let err = submit_prediction(&api, "John Doe", &draft).unwrap_err();
        match err {
            PredictError::Validation(v) => assert_eq!(v.field, "RestingBP"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(api.counts().predict, 0);
        assert_eq!(api.counts().patient_predictions, 0);
    }

    #[test]
    fn empty_patient_name_is_rejected_locally() {
        let api = MockBackend::new();
        let err = submit_prediction(&api, "   ", &complete_draft()).unwrap_err();
        assert!(matches!(err, PredictError::Validation(_)));
        assert_eq!(api.counts().predict, 0);
    }

    #[test]
    fn displays_the_most_recent_persisted_record() {
        let api = MockBackend::new()
            .with_predict(vec![RiskResult {
                risk_level: "High".into(),
                probability: 0.82,
            }])
            .with_history(vec![
                record("2024-03-10", "Low"),
                record("2026-08-27", "High"),
                record("2024-06-15", "Medium"),
            ]);

        let diagnosis = submit_prediction(&api, "John Doe", &complete_draft()).unwrap();
        assert_eq!(diagnosis.date, "2026-08-27");
        assert_eq!(
            diagnosis.medicine_lines,
            vec!["Aspirin (daily)", "Statins", "Beta-blockers"]
        );
        // Submit then confirm: exactly one call to each endpoint.
        assert_eq!(api.counts().predict, 1);
        assert_eq!(api.counts().patient_predictions, 1);
    }

    #[test]
    fn date_ties_go_to_server_order() {
        let first = record("2026-08-27", "High");
        let second = record("2026-08-27", "Low");
        let records = vec![first.clone(), second];
        let latest = latest_record(&records).unwrap();
        assert_eq!(latest, &first);
    }

    #[test]
    fn unparseable_dates_cannot_be_most_recent() {
        let records = vec![record("not-a-date", "High"), record("2024-06-15", "Low")];
        assert_eq!(latest_record(&records).unwrap().date.as_deref(), Some("2024-06-15"));
        assert!(latest_record(&[record("???", "High")]).is_none());
    }

    #[test]
    fn empty_predict_reply_is_a_submission_error() {
        let api = MockBackend::new().with_predict(Vec::new());
        let err = submit_prediction(&api, "John Doe", &complete_draft()).unwrap_err();
        assert!(matches!(err, PredictError::Submission(_)));
    }

    #[test]
    fn predict_server_error_is_a_submission_error() {
        let api = MockBackend::new().with_predict_error(ApiError::Server {
            status: 500,
            body: "boom".into(),
        });
        let err = submit_prediction(&api, "John Doe", &complete_draft()).unwrap_err();
        assert!(matches!(err, PredictError::Submission(_)));
        assert_eq!(api.counts().patient_predictions, 0);
    }

    #[test]
    fn empty_history_after_submit_is_no_record_found() {
        let api = MockBackend::new().with_history(Vec::new());
        let err = submit_prediction(&api, "John Doe", &complete_draft()).unwrap_err();
        assert_eq!(err, PredictError::NoRecordFound("John Doe".to_string()));
    }

    #[test]
    fn history_failure_after_submit_is_a_confirmation_error() {
        let api = MockBackend::new().with_history_error(ApiError::Timeout(60));
        let err = submit_prediction(&api, "John Doe", &complete_draft()).unwrap_err();
        assert!(matches!(err, PredictError::Confirmation(_)));
    }
}
