//! Analysis backend access.
//!
//! Everything the app computes remotely — speech-to-text extraction, risk
//! prediction, persisted history, account calls — goes through the
//! [`BackendApi`] trait. [`client::HttpBackend`] is the real client;
//! [`mock::MockBackend`] drives tests and records call counts.

pub mod client;
pub mod mock;

use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::models::{ExtractionResult, FeatureSnapshot, PredictionRecord, RiskResult};

pub use client::HttpBackend;
pub use mock::MockBackend;

/// Transport- and server-level failures. Field validation never reaches
/// this layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("Malformed server response: {0}")]
    MalformedBody(String),
    #[error("Could not package audio artifact: {0}")]
    Artifact(String),
}

impl ApiError {
    /// HTTP status for server-rejected requests, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Success body of a login call. The backend echoes the account name;
/// callers fall back to the entered name when it does not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub name: Option<String>,
}

/// The remote analysis backend. One method per endpoint; no retries —
/// re-triggering is the user's call.
pub trait BackendApi: Send + Sync {
    /// `POST /api/audio/analyze` — multipart upload of the captured
    /// artifact under the `audioFile` field.
    fn analyze_audio(&self, artifact_uri: &str) -> Result<ExtractionResult, ApiError>;

    /// `POST /api/text/analyze`.
    fn analyze_text(&self, text: &str) -> Result<ExtractionResult, ApiError>;

    /// `POST /api/heart/predict`. The reply is immediate and
    /// non-authoritative for display.
    fn predict(
        &self,
        patient_name: &str,
        snapshot: &FeatureSnapshot,
    ) -> Result<Vec<RiskResult>, ApiError>;

    /// `GET /api/patient/{name}/predictions` — the authoritative history.
    fn patient_predictions(&self, patient_name: &str) -> Result<Vec<PredictionRecord>, ApiError>;

    /// `POST /api/{doctor|patient}/login`.
    fn login(&self, role: Role, name: &str, password: &str) -> Result<LoginReply, ApiError>;

    /// `POST /api/{doctor|patient}/register`.
    fn register(&self, role: Role, name: &str, password: &str) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_for_server_errors() {
        let err = ApiError::Server {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ApiError::Timeout(60).status(), None);
        assert!(ApiError::Timeout(60).is_timeout());
        assert!(!err.is_timeout());
    }

    #[test]
    fn login_reply_defaults_to_anonymous() {
        let reply: LoginReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply.name, None);
        let reply: LoginReply = serde_json::from_str(r#"{"name": "John Doe"}"#).unwrap();
        assert_eq!(reply.name.as_deref(), Some("John Doe"));
    }
}
