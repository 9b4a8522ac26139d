pub mod auth;
pub mod backend;
pub mod capture;
pub mod commands;
pub mod config;
pub mod core_state;
pub mod models;
pub mod reconcile;
pub mod workflow;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("CardioScribe starting v{}", config::APP_VERSION);

    tauri::Builder::default()
        .manage(Arc::new(core_state::CoreState::new()))
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::auth::login,
            commands::auth::register,
            commands::auth::logout,
            commands::auth::current_session,
            commands::recording::start_recording,
            commands::recording::stop_recording,
            commands::diagnosis::analyze_audio,
            commands::diagnosis::analyze_text,
            commands::diagnosis::begin_feature_edit,
            commands::diagnosis::update_feature_field,
            commands::diagnosis::commit_feature_edit,
            commands::diagnosis::cancel_feature_edit,
            commands::diagnosis::get_feature_draft,
            commands::diagnosis::submit_prediction,
            commands::diagnosis::reset_diagnosis,
            commands::history::search_patient_history,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
