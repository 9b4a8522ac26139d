//! Clinical feature model for heart-disease risk prediction.
//!
//! Three layers, matching how values move through the app:
//! - [`FeatureField`]: the closed set of eleven clinical fields the
//!   prediction endpoint understands, with canonical wire names.
//! - [`FeatureDraft`]: field → raw string, tolerant of extraction casing.
//!   This is what the user edits.
//! - [`FeatureSnapshot`]: fully typed, produced only by validating a
//!   complete draft. Submission is impossible without one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field-level validation failure. Always names the offending field so the
/// UI can highlight it; raised locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value for {field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    fn missing(field: &FeatureField) -> Self {
        Self::new(field.wire_name(), "value is missing")
    }
}

/// Macro to generate a clinical enum with wire token + tolerant parse.
/// Accepted spellings beyond the wire token follow each `|`.
macro_rules! clinical_enum {
    ($name:ident, $expected:literal {
        $($variant:ident => $s:literal $(| $alt:literal)*),+ $(,)?
    }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const EXPECTED: &'static str = $expected;

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Case-insensitive parse of the wire token or an accepted
            /// human spelling.
            pub fn parse(s: &str) -> Option<Self> {
                let t = s.trim();
                $(
                    if t.eq_ignore_ascii_case($s) $(|| t.eq_ignore_ascii_case($alt))* {
                        return Some(Self::$variant);
                    }
                )+
                None
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
                ser.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
                let s = String::deserialize(de)?;
                Self::parse(&s).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        concat!("expected one of ", $expected, ", got '{}'"),
                        s
                    ))
                })
            }
        }
    };
}

clinical_enum!(Sex, "M, F" {
    M => "M" | "Male",
    F => "F" | "Female",
});

clinical_enum!(ChestPainType, "ATA, NAP, ASY, TA" {
    Ata => "ATA" | "Atypical Angina",
    Nap => "NAP" | "Non-Anginal Pain",
    Asy => "ASY" | "Asymptomatic",
    Ta => "TA" | "Typical Angina",
});

clinical_enum!(RestingEcg, "Normal, ST, LVH" {
    Normal => "Normal",
    St => "ST",
    Lvh => "LVH",
});

clinical_enum!(ExerciseAngina, "Y, N" {
    Y => "Y" | "Yes",
    N => "N" | "No",
});

clinical_enum!(StSlope, "Up, Flat, Down" {
    Up => "Up",
    Flat => "Flat",
    Down => "Down",
});

// ═══════════════════════════════════════════════════════════
// FeatureField — the closed clinical field set
// ═══════════════════════════════════════════════════════════

/// One of the eleven clinical input fields of the prediction model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureField {
    Age,
    Sex,
    ChestPainType,
    RestingBp,
    Cholesterol,
    FastingBs,
    RestingEcg,
    MaxHr,
    ExerciseAngina,
    Oldpeak,
    StSlope,
}

impl FeatureField {
    pub const ALL: [FeatureField; 11] = [
        Self::Age,
        Self::Sex,
        Self::ChestPainType,
        Self::RestingBp,
        Self::Cholesterol,
        Self::FastingBs,
        Self::RestingEcg,
        Self::MaxHr,
        Self::ExerciseAngina,
        Self::Oldpeak,
        Self::StSlope,
    ];

    /// Canonical field name on the wire (`patientData` and
    /// `features_extracted` payloads).
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::ChestPainType => "ChestPainType",
            Self::RestingBp => "RestingBP",
            Self::Cholesterol => "Cholesterol",
            Self::FastingBs => "FastingBS",
            Self::RestingEcg => "RestingECG",
            Self::MaxHr => "MaxHR",
            Self::ExerciseAngina => "ExerciseAngina",
            Self::Oldpeak => "Oldpeak",
            Self::StSlope => "ST_Slope",
        }
    }

    /// Human-readable label for display lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::ChestPainType => "Chest pain type",
            Self::RestingBp => "Resting BP",
            Self::Cholesterol => "Cholesterol",
            Self::FastingBs => "Fasting blood sugar",
            Self::RestingEcg => "Resting ECG",
            Self::MaxHr => "Max heart rate",
            Self::ExerciseAngina => "Exercise angina",
            Self::Oldpeak => "Oldpeak",
            Self::StSlope => "ST slope",
        }
    }

    /// Whether the field carries a numeric value (input-boundary checked).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Age
                | Self::RestingBp
                | Self::Cholesterol
                | Self::FastingBs
                | Self::MaxHr
                | Self::Oldpeak
        )
    }

    /// Match an extraction/form key against the field set, tolerating
    /// case and separator differences ("resting_bp", "ST Slope", "maxhr").
    pub fn match_key(key: &str) -> Option<Self> {
        let normalized = normalize_key(key);
        Self::ALL
            .iter()
            .copied()
            .find(|f| normalize_key(f.wire_name()) == normalized)
    }
}

impl std::fmt::Display for FeatureField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Serialize for FeatureField {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for FeatureField {
    fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::match_key(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown clinical field '{s}'")))
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ═══════════════════════════════════════════════════════════
// FeatureDraft — editable raw values
// ═══════════════════════════════════════════════════════════

/// Raw field values as extracted or typed. Ordered by field for stable
/// serialization and byte-for-byte equality checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureDraft {
    values: BTreeMap<FeatureField, String>,
}

impl FeatureDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loose string pairs (manual form input). Unknown keys are
    /// an error here — the form only offers the closed field set.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ValidationError> {
        let mut draft = Self::new();
        for (key, value) in pairs {
            let field = FeatureField::match_key(key)
                .ok_or_else(|| ValidationError::new(key, "unknown clinical field"))?;
            draft.set(field, value)?;
        }
        Ok(draft)
    }

    pub fn get(&self, field: FeatureField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Set one field. Numeric fields are checked at this input boundary —
    /// non-numeric input is rejected, never coerced.
    pub fn set(&mut self, field: FeatureField, value: &str) -> Result<(), ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(field.wire_name(), "value is empty"));
        }
        if field.is_numeric() {
            check_numeric(field, trimmed)?;
        }
        self.values.insert(field, trimmed.to_string());
        Ok(())
    }

    /// Store a raw extraction value without boundary checks; bad values
    /// are caught at [`FeatureDraft::finalize`].
    pub(crate) fn set_raw(&mut self, field: FeatureField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureField, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Validate the complete draft into a typed snapshot. The first field
    /// that is missing or fails its type check aborts with a
    /// [`ValidationError`] naming it; no partial snapshot exists.
    pub fn finalize(&self) -> Result<FeatureSnapshot, ValidationError> {
        Ok(FeatureSnapshot {
            age: self.parse_int(FeatureField::Age)?,
            sex: self.parse_enum(FeatureField::Sex, Sex::parse, Sex::EXPECTED)?,
            chest_pain_type: self.parse_enum(
                FeatureField::ChestPainType,
                ChestPainType::parse,
                ChestPainType::EXPECTED,
            )?,
            resting_bp: self.parse_int(FeatureField::RestingBp)?,
            cholesterol: self.parse_int(FeatureField::Cholesterol)?,
            fasting_bs: self.parse_binary(FeatureField::FastingBs)?,
            resting_ecg: self.parse_enum(
                FeatureField::RestingEcg,
                RestingEcg::parse,
                RestingEcg::EXPECTED,
            )?,
            max_hr: self.parse_int(FeatureField::MaxHr)?,
            exercise_angina: self.parse_enum(
                FeatureField::ExerciseAngina,
                ExerciseAngina::parse,
                ExerciseAngina::EXPECTED,
            )?,
            oldpeak: self.parse_decimal(FeatureField::Oldpeak)?,
            st_slope: self.parse_enum(FeatureField::StSlope, StSlope::parse, StSlope::EXPECTED)?,
        })
    }

    fn raw(&self, field: FeatureField) -> Result<&str, ValidationError> {
        self.get(field).ok_or_else(|| ValidationError::missing(&field))
    }

    fn parse_int(&self, field: FeatureField) -> Result<u32, ValidationError> {
        let raw = self.raw(field)?;
        raw.parse::<u32>()
            .map_err(|_| ValidationError::new(field.wire_name(), format!("'{raw}' is not a whole number")))
    }

    fn parse_decimal(&self, field: FeatureField) -> Result<f64, ValidationError> {
        let raw = self.raw(field)?;
        raw.parse::<f64>()
            .map_err(|_| ValidationError::new(field.wire_name(), format!("'{raw}' is not a number")))
    }

    fn parse_binary(&self, field: FeatureField) -> Result<u8, ValidationError> {
        match self.raw(field)? {
            "0" => Ok(0),
            "1" => Ok(1),
            other => Err(ValidationError::new(
                field.wire_name(),
                format!("'{other}' is not 0 or 1"),
            )),
        }
    }

    fn parse_enum<T>(
        &self,
        field: FeatureField,
        parse: impl Fn(&str) -> Option<T>,
        expected: &str,
    ) -> Result<T, ValidationError> {
        let raw = self.raw(field)?;
        parse(raw).ok_or_else(|| {
            ValidationError::new(
                field.wire_name(),
                format!("'{raw}' is not one of {expected}"),
            )
        })
    }
}

fn check_numeric(field: FeatureField, value: &str) -> Result<(), ValidationError> {
    let ok = match field {
        FeatureField::Oldpeak => value.parse::<f64>().is_ok(),
        FeatureField::FastingBs => matches!(value, "0" | "1"),
        _ => value.parse::<u32>().is_ok(),
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new(
            field.wire_name(),
            format!("'{value}' is not numeric"),
        ))
    }
}

// ═══════════════════════════════════════════════════════════
// FeatureSnapshot — typed, submission-ready
// ═══════════════════════════════════════════════════════════

/// Fully typed clinical input record. Only a complete, valid draft can
/// produce one, so holding a snapshot is proof the data passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Sex")]
    pub sex: Sex,
    #[serde(rename = "ChestPainType")]
    pub chest_pain_type: ChestPainType,
    #[serde(rename = "RestingBP")]
    pub resting_bp: u32,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: u32,
    #[serde(rename = "FastingBS")]
    pub fasting_bs: u8,
    #[serde(rename = "RestingECG")]
    pub resting_ecg: RestingEcg,
    #[serde(rename = "MaxHR")]
    pub max_hr: u32,
    #[serde(rename = "ExerciseAngina")]
    pub exercise_angina: ExerciseAngina,
    #[serde(rename = "Oldpeak")]
    pub oldpeak: f64,
    #[serde(rename = "ST_Slope")]
    pub st_slope: StSlope,
}

#[cfg(test)]
pub(crate) fn complete_draft() -> FeatureDraft {
    let mut draft = FeatureDraft::new();
    for (field, value) in [
        (FeatureField::Age, "45"),
        (FeatureField::Sex, "M"),
        (FeatureField::ChestPainType, "ATA"),
        (FeatureField::RestingBp, "140"),
        (FeatureField::Cholesterol, "289"),
        (FeatureField::FastingBs, "0"),
        (FeatureField::RestingEcg, "Normal"),
        (FeatureField::MaxHr, "172"),
        (FeatureField::ExerciseAngina, "N"),
        (FeatureField::Oldpeak, "0.5"),
        (FeatureField::StSlope, "Up"),
    ] {
        draft.set(field, value).unwrap();
    }
    draft
}
