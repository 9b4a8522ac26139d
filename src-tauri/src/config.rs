//! Application constants and backend endpoint configuration.

/// Application-level constants
pub const APP_NAME: &str = "CardioScribe";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default analysis backend (local dev server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Per-request timeout for JSON endpoints.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Timeout for the audio upload — speech-to-text and feature extraction
/// run server-side before the response comes back.
pub const UPLOAD_TIMEOUT_SECS: u64 = 180;

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "CARDIOSCRIBE_API_URL";

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "info,cardioscribe_lib=debug".to_string()
}

/// Backend base URL: env override, else the default.
pub fn base_url() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}
