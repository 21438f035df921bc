use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Caller contract violations raised by the matcher, scorer and optimizer.
///
/// Solver failures never appear here: they are recovered inside the optimizer
/// and reported through `PlanSolution::fallback_reason` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Verdicts do not cover job requirements: missing {}", missing.join(", "))]
    ProfileMismatch { missing: Vec<String> },

    #[error("Invalid constraints: {0}")]
    InvalidConstraints(String),

    #[error("Skills unreachable under the current budget: {}", skills.join(", "))]
    InfeasibleSingleton { skills: Vec<String> },
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(err) => {
                let (status, code) = match err {
                    AnalysisError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                    AnalysisError::InvalidConstraints(_) => {
                        (StatusCode::BAD_REQUEST, "INVALID_CONSTRAINTS")
                    }
                    AnalysisError::ProfileMismatch { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "PROFILE_MISMATCH")
                    }
                    AnalysisError::InfeasibleSingleton { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INFEASIBLE_SINGLETON")
                    }
                };
                (status, code, err.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
