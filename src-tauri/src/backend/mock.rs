//! Mock backend for tests — configurable replies plus call counting.

use std::sync::Mutex;

use super::{ApiError, BackendApi, LoginReply};
use crate::auth::Role;
use crate::models::{ExtractionResult, FeatureSnapshot, PredictionRecord, RiskResult};

/// How many times each endpoint was hit. Used by tests asserting that
/// validation failures make no network call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallCounts {
    pub analyze_audio: usize,
    pub analyze_text: usize,
    pub predict: usize,
    pub patient_predictions: usize,
    pub login: usize,
    pub register: usize,
}

/// Configurable [`BackendApi`] double.
pub struct MockBackend {
    extraction: Result<ExtractionResult, ApiError>,
    predict: Result<Vec<RiskResult>, ApiError>,
    history: Result<Vec<PredictionRecord>, ApiError>,
    login: Result<LoginReply, ApiError>,
    register: Result<(), ApiError>,
    calls: Mutex<CallCounts>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            extraction: Ok(ExtractionResult::default()),
            predict: Ok(vec![RiskResult {
                risk_level: "High".to_string(),
                probability: 0.82,
            }]),
            history: Ok(Vec::new()),
            login: Ok(LoginReply::default()),
            register: Ok(()),
            calls: Mutex::new(CallCounts::default()),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extraction(mut self, extraction: ExtractionResult) -> Self {
        self.extraction = Ok(extraction);
        self
    }

    pub fn with_extraction_error(mut self, error: ApiError) -> Self {
        self.extraction = Err(error);
        self
    }

    pub fn with_predict(mut self, results: Vec<RiskResult>) -> Self {
        self.predict = Ok(results);
        self
    }

    pub fn with_predict_error(mut self, error: ApiError) -> Self {
        self.predict = Err(error);
        self
    }

    pub fn with_history(mut self, records: Vec<PredictionRecord>) -> Self {
        self.history = Ok(records);
        self
    }

    pub fn with_history_error(mut self, error: ApiError) -> Self {
        self.history = Err(error);
        self
    }

    pub fn with_login_name(mut self, name: &str) -> Self {
        self.login = Ok(LoginReply {
            name: Some(name.to_string()),
        });
        self
    }

    pub fn with_login_error(mut self, error: ApiError) -> Self {
        self.login = Err(error);
        self
    }

    pub fn counts(&self) -> CallCounts {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn bump(&self, pick: impl FnOnce(&mut CallCounts) -> &mut usize) {
        if let Ok(mut counts) = self.calls.lock() {
            *pick(&mut counts) += 1;
        }
    }
}

impl BackendApi for MockBackend {
    fn analyze_audio(&self, _artifact_uri: &str) -> Result<ExtractionResult, ApiError> {
        self.bump(|c| &mut c.analyze_audio);
        self.extraction.clone()
    }

    fn analyze_text(&self, _text: &str) -> Result<ExtractionResult, ApiError> {
        self.bump(|c| &mut c.analyze_text);
        self.extraction.clone()
    }

    fn predict(
        &self,
        _patient_name: &str,
        _snapshot: &FeatureSnapshot,
    ) -> Result<Vec<RiskResult>, ApiError> {
        self.bump(|c| &mut c.predict);
        self.predict.clone()
    }

    fn patient_predictions(&self, _patient_name: &str) -> Result<Vec<PredictionRecord>, ApiError> {
        self.bump(|c| &mut c.patient_predictions);
        self.history.clone()
    }

    fn login(&self, _role: Role, _name: &str, _password: &str) -> Result<LoginReply, ApiError> {
        self.bump(|c| &mut c.login);
        self.login.clone()
    }

    fn register(&self, _role: Role, _name: &str, _password: &str) -> Result<(), ApiError> {
        self.bump(|c| &mut c.register);
        self.register.clone()
    }
}
