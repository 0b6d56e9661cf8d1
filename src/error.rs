// Error types for the search pipeline and their HTTP responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::criteria::ValidationError;

/// Failures a single search can end with.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Missing required setting `{setting}` (set {env_var})")]
    MissingSetting {
        setting: &'static str,
        env_var: &'static str,
    },

    // Message is already the best one available: upstream, status text, or fallback
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Inventory request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

// Web-facing error type, converted into a response by axum
#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    BadRequest(String),
    Configuration(String),
    Upstream(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::MissingSetting { .. } => AppError::Configuration(error.to_string()),
            SearchError::Http { .. } | SearchError::Transport(_) => {
                AppError::Upstream(error.to_string())
            }
        }
    }
}

impl AppError {
    /// Status code and the message that is safe to show the user.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::InternalServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Configuration(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
            AppError::Upstream(message) => (StatusCode::BAD_GATEWAY, message.clone()),
        }
    }

    fn log(&self) {
        match self {
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e)
            }
            AppError::BadRequest(message) => tracing::info!(%message, "Rejected search request"),
            AppError::Configuration(message) => {
                tracing::error!(%message, "Search is not configured")
            }
            AppError::Upstream(message) => tracing::warn!(%message, "Inventory search failed"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let (status, error_message) = self.status_and_message();
        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_map_to_status_codes() {
        let missing: AppError = SearchError::MissingSetting {
            setting: "api_key",
            env_var: "APP_API_KEY",
        }
        .into();
        let (status, message) = missing.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(message.contains("api_key"));

        let upstream: AppError = SearchError::Http {
            status: 401,
            message: "Invalid API key".to_string(),
        }
        .into();
        assert_eq!(
            upstream.status_and_message(),
            (StatusCode::BAD_GATEWAY, "Invalid API key".to_string())
        );
    }

    #[test]
    fn internal_errors_are_not_exposed() {
        let err = AppError::from(anyhow::anyhow!("template blew up at line 3"));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal Server Error");
    }
}
