//! Blocking HTTP client for the analysis backend.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiError, BackendApi, LoginReply};
use crate::auth::Role;
use crate::config;
use crate::models::{ExtractionResult, FeatureSnapshot, PredictionRecord, RiskResult};

/// Real backend client. One instance lives in `CoreState` for the whole
/// app run; reqwest pools connections underneath.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

/// Request body for `POST /api/heart/predict`. The server expects the
/// snapshot wrapped in a one-element array.
#[derive(Serialize)]
struct PredictRequest<'a> {
    #[serde(rename = "patientName")]
    patient_name: &'a str,
    #[serde(rename = "patientData")]
    patient_data: [&'a FeatureSnapshot; 1],
}

#[derive(Serialize)]
struct TextAnalyzeRequest<'a> {
    text: &'a str,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client against the configured base URL (env override respected).
    pub fn from_env() -> Self {
        Self::new(&config::base_url(), config::REQUEST_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base}/api/patient/{name}/predictions` with the patient name
    /// percent-encoded as a single path segment.
    fn predictions_url(&self, patient_name: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Network(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Network("base URL cannot carry a path".into()))?
            .extend(["api", "patient", patient_name, "predictions"]);
        Ok(url)
    }

    fn transport_err(&self, e: reqwest::Error, timeout_secs: u64) -> ApiError {
        if e.is_connect() {
            ApiError::Network(format!("cannot reach {}", self.base_url))
        } else if e.is_timeout() {
            ApiError::Timeout(timeout_secs)
        } else {
            ApiError::Network(e.to_string())
        }
    }

    fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .map_err(|e| ApiError::MalformedBody(e.to_string()))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| self.transport_err(e, self.timeout_secs))?;
        self.read_json(response)
    }
}

impl BackendApi for HttpBackend {
    fn analyze_audio(&self, artifact_uri: &str) -> Result<ExtractionResult, ApiError> {
        let path = Path::new(artifact_uri.strip_prefix("file://").unwrap_or(artifact_uri));
        let bytes = std::fs::read(path)
            .map_err(|e| ApiError::Artifact(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording.m4a".to_string());

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/m4a")
            .map_err(|e| ApiError::Artifact(e.to_string()))?;
        let form = multipart::Form::new().part("audioFile", part);

        let url = format!("{}/api/audio/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(Duration::from_secs(config::UPLOAD_TIMEOUT_SECS))
            .send()
            .map_err(|e| self.transport_err(e, config::UPLOAD_TIMEOUT_SECS))?;
        self.read_json(response)
    }

    fn analyze_text(&self, text: &str) -> Result<ExtractionResult, ApiError> {
        self.post_json("/api/text/analyze", &TextAnalyzeRequest { text })
    }

    fn predict(
        &self,
        patient_name: &str,
        snapshot: &FeatureSnapshot,
    ) -> Result<Vec<RiskResult>, ApiError> {
        self.post_json(
            "/api/heart/predict",
            &PredictRequest {
                patient_name,
                patient_data: [snapshot],
            },
        )
    }

    fn patient_predictions(&self, patient_name: &str) -> Result<Vec<PredictionRecord>, ApiError> {
        let url = self.predictions_url(patient_name)?;
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.transport_err(e, self.timeout_secs))?;
        self.read_json(response)
    }

    fn login(&self, role: Role, name: &str, password: &str) -> Result<LoginReply, ApiError> {
        let path = format!("/api/{}/login", role.as_str());
        let body = serde_json::json!({ "name": name, "password": password });
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.transport_err(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        // The success body varies by backend version; tolerate anything
        // and fall back to an anonymous reply.
        let text = response.text().unwrap_or_default();
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    fn register(&self, role: Role, name: &str, password: &str) -> Result<(), ApiError> {
        let path = format!("/api/{}/register", role.as_str());
        // The doctor endpoint registers by email, the patient one by name.
        let body = match role {
            Role::Doctor => serde_json::json!({ "email": name, "password": password }),
            Role::Patient => serde_json::json!({ "name": name, "password": password }),
        };
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.transport_err(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
