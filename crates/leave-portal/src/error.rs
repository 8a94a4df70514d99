use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::leave::{LeaveImportError, LeaveServiceError, RepositoryError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("import error: {0}")]
    Import(#[from] LeaveImportError),
    #[error("leave workflow error: {0}")]
    Leave(#[from] LeaveServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Leave(LeaveServiceError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Leave(LeaveServiceError::Authorization(_)) => StatusCode::FORBIDDEN,
            AppError::Leave(LeaveServiceError::Transition(_))
            | AppError::Leave(LeaveServiceError::Repository(RepositoryError::Conflict)) => {
                StatusCode::CONFLICT
            }
            AppError::Leave(LeaveServiceError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Leave(LeaveServiceError::Repository(RepositoryError::Unavailable(_)))
            | AppError::Leave(LeaveServiceError::Directory(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
