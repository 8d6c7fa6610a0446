//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire web service.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use diabetes_core::{ArtifactError, PortError};
use tracing::error;

use crate::config::ConfigError;
use crate::web::pages;

/// The primary error type for the web service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The session store could not load or save the per-browser state.
    #[error("Session Error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The model artifact could not be parsed or failed validation.
    #[error("Model artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Expected failures are turned into flash messages by the handlers; anything that
// reaches this point is unexpected, so the cause is logged and the page stays generic.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(pages::error_page("An internal server error occurred.")),
        )
            .into_response()
    }
}
