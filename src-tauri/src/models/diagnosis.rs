//! `DisplayDiagnosis` — the read-only view model the UI renders.
//!
//! Derived fresh from a [`PredictionRecord`] on every build; never stored,
//! never mutated. Carries display strings only.

use chrono::NaiveDate;
use serde::Serialize;

use super::features::{
    ChestPainType, ExerciseAngina, FeatureField, RestingEcg, Sex, StSlope,
};
use super::prediction::{PredictionRecord, RiskCategory};

/// One rendered history entry: date, symptom lines, prediction line,
/// medicine recommendation lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayDiagnosis {
    /// Normalized `YYYY-MM-DD`.
    pub date: String,
    pub symptom_lines: Vec<String>,
    pub prediction_line: String,
    pub medicine_lines: Vec<String>,
}

impl DisplayDiagnosis {
    /// Project a persisted record into its display form.
    ///
    /// Returns `None` for records that cannot be displayed: missing
    /// `riskLevel`, missing `date`, or a date that does not parse. No
    /// date is ever fabricated for an unparseable record.
    pub fn from_record(record: &PredictionRecord) -> Option<Self> {
        let risk_label = record.risk_level.as_deref()?;
        let date = normalize_date(record.date.as_deref()?)?;
        Some(Self {
            date,
            symptom_lines: symptom_lines(&record.input_data),
            prediction_line: prediction_line(risk_label, record.probability),
            medicine_lines: RiskCategory::from_label(risk_label).medicine_lines(),
        })
    }
}

/// Normalize a server date string to `YYYY-MM-DD`. Accepts plain dates,
/// RFC 3339 / SQL timestamps, and `DD/MM/YYYY`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let t = raw.trim();
    let date = NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .or_else(|| chrono::DateTime::parse_from_rfc3339(t).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(t, "%d/%m/%Y").ok())?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Human-readable `Label: value` lines from a record's `inputData`.
/// Fields whose value resolves to "N/A" are omitted, as are keys outside
/// the clinical field set. Line order follows the canonical field order.
pub fn symptom_lines(input_data: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
    let mut lines = Vec::new();
    for field in FeatureField::ALL {
        let Some(raw) = input_data.iter().find_map(|(key, value)| {
            (FeatureField::match_key(key) == Some(field))
                .then(|| super::extraction::value_to_string(value))
                .flatten()
        }) else {
            continue;
        };
        if let Some(value) = display_value(field, &raw) {
            lines.push(format!("{}: {}", field.label(), value));
        }
    }
    lines
}

/// `Risk: High (82% probability)`, or without the parenthetical when the
/// record carries no probability.
pub fn prediction_line(risk_label: &str, probability: Option<f64>) -> String {
    match probability {
        Some(p) => format!(
            "Risk: {} ({:.0}% probability)",
            risk_label.trim(),
            p * 100.0
        ),
        None => format!("Risk: {}", risk_label.trim()),
    }
}

/// Map one raw field value to its display form; `None` means "N/A".
fn display_value(field: FeatureField, raw: &str) -> Option<String> {
    let owned = |s: &str| Some(s.to_string());
    match field {
        FeatureField::Sex => match Sex::parse(raw)? {
            Sex::M => owned("Male"),
            Sex::F => owned("Female"),
        },
        FeatureField::ChestPainType => match ChestPainType::parse(raw)? {
            ChestPainType::Ata => owned("Atypical angina"),
            ChestPainType::Nap => owned("Non-anginal pain"),
            ChestPainType::Asy => owned("Asymptomatic"),
            ChestPainType::Ta => owned("Typical angina"),
        },
        FeatureField::RestingEcg => match RestingEcg::parse(raw)? {
            RestingEcg::Normal => owned("Normal"),
            RestingEcg::St => owned("ST abnormality"),
            RestingEcg::Lvh => owned("LVH"),
        },
        FeatureField::ExerciseAngina => match ExerciseAngina::parse(raw)? {
            ExerciseAngina::Y => owned("Yes"),
            ExerciseAngina::N => owned("No"),
        },
        FeatureField::StSlope => owned(StSlope::parse(raw)?.as_str()),
        FeatureField::FastingBs => match raw.trim() {
            "1" => owned("Above 120 mg/dl"),
            "0" => owned("Normal"),
            _ => None,
        },
        // Numeric fields display as-is, provided they are numeric at all.
        _ => raw.trim().parse::<f64>().ok().map(|_| raw.trim().to_string()),
    }
}
