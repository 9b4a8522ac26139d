//! Server extraction payloads.
//!
//! The audio endpoint answers with a transcript, a de-identified variant,
//! a summary, and a `features_extracted` object; the text endpoint answers
//! with the legacy `{symptoms, medicines, summary}` shape. Both deserialize
//! into [`ExtractionResult`] — absent fields just default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::features::{FeatureDraft, FeatureField};

/// One extraction response. Replaces any prior extraction in the session
/// wholesale (last-write-wins; extractions are never merged).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(
        default,
        rename = "de_identified_transcript",
        skip_serializing_if = "Option::is_none"
    )]
    pub de_identified_transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, rename = "features_extracted")]
    pub features_extracted: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medicines: Vec<String>,
}

impl ExtractionResult {
    /// Reconcile `features_extracted` into an editable draft. Keys are
    /// matched tolerantly; keys outside the clinical field set are ignored.
    pub fn to_draft(&self) -> FeatureDraft {
        let mut draft = FeatureDraft::new();
        for (key, value) in &self.features_extracted {
            let Some(field) = FeatureField::match_key(key) else {
                tracing::debug!(key, "ignoring unrecognized extracted field");
                continue;
            };
            if let Some(raw) = value_to_string(value) {
                draft.set_raw(field, raw);
            }
        }
        draft
    }
}

/// Render an extraction value as an editable string. Booleans collapse to
/// the 0/1 convention of `FastingBS`; null and nested values are dropped.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_audio_analyze_shape() {
        let body = r#"{
            "transcript": "patient reports chest pain",
            "de_identified_transcript": "[PATIENT] reports chest pain",
            "summary": "chest pain, exertional",
            "features_extracted": {"Age": 45, "Sex": "M", "Oldpeak": 1.5}
        }"#;
        let result: ExtractionResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.transcript.as_deref(), Some("patient reports chest pain"));
        assert_eq!(result.features_extracted.len(), 3);
        assert!(result.symptoms.is_empty());
    }

    #[test]
    fn deserializes_text_analyze_shape() {
        let body = r#"{"symptoms": ["chest pain"], "medicines": ["aspirin"], "summary": "s"}"#;
        let result: ExtractionResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.symptoms, vec!["chest pain"]);
        assert_eq!(result.medicines, vec!["aspirin"]);
        assert!(result.features_extracted.is_empty());
    }

    #[test]
    fn to_draft_reconciles_values_and_casing() {
        let body = r#"{"features_extracted": {
            "age": 45,
            "Sex": "M",
            "fasting_bs": true,
            "Oldpeak": 1.5,
            "clinic_room": "4B",
            "notes": null
        }}"#;
        let result: ExtractionResult = serde_json::from_str(body).unwrap();
        let draft = result.to_draft();
        assert_eq!(draft.get(FeatureField::Age), Some("45"));
        assert_eq!(draft.get(FeatureField::Sex), Some("M"));
        assert_eq!(draft.get(FeatureField::FastingBs), Some("1"));
        assert_eq!(draft.get(FeatureField::Oldpeak), Some("1.5"));
        // Unknown and null keys are dropped, not stored.
        assert_eq!(draft.len(), 4);
    }

    #[test]
    fn empty_body_is_a_valid_empty_extraction() {
        let result: ExtractionResult = serde_json::from_str("{}").unwrap();
        assert_eq!(result, ExtractionResult::default());
        assert!(result.to_draft().is_empty());
    }
}
