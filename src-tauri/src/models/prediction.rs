//! Prediction wire types and the risk → medicine mapping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immediate reply of `POST /api/heart/predict`. Acknowledged, then
/// discarded — the persisted record fetched afterwards is what gets
/// displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    #[serde(rename = "RiskLevel")]
    pub risk_level: String,
    #[serde(rename = "Probability")]
    pub probability: f64,
}

/// One row of a patient's persisted history
/// (`GET /api/patient/{name}/predictions`). Read-only on the client; the
/// only way to change history is to submit a new snapshot and re-fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, rename = "riskLevel", skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, rename = "inputData")]
    pub input_data: serde_json::Map<String, Value>,
}

/// Risk category buckets. [`RiskCategory::from_label`] is total: any label
/// outside the known set lands in `Other`, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    High,
    Medium,
    Low,
    Negative,
    Other,
}

impl RiskCategory {
    /// Case-insensitive, trimming classification of a server risk label.
    pub fn from_label(label: &str) -> Self {
        let t = label.trim();
        if t.eq_ignore_ascii_case("high") {
            Self::High
        } else if t.eq_ignore_ascii_case("medium") {
            Self::Medium
        } else if t.eq_ignore_ascii_case("low") {
            Self::Low
        } else if t.eq_ignore_ascii_case("negative") {
            Self::Negative
        } else {
            Self::Other
        }
    }

    /// Fixed medicine recommendation lines per risk bucket.
    pub fn medicine_lines(&self) -> Vec<String> {
        let lines: &[&str] = match self {
            Self::High => &["Aspirin (daily)", "Statins", "Beta-blockers"],
            Self::Medium => &["Aspirin (as needed)", "Lifestyle changes recommended"],
            Self::Low | Self::Negative => {
                &["No immediate medication", "Maintain healthy lifestyle"]
            }
            Self::Other => &["Consult a doctor for recommendations"],
        };
        lines.iter().map(|s| s.to_string()).collect()
    }
}
