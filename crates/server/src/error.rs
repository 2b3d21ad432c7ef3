use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{habits::HabitError, ledger::LedgerError};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Habit(#[from] HabitError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("missing or invalid authentication")]
    Unauthorized,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Habit(HabitError::NotFound) | ApiError::Ledger(LedgerError::HabitNotFound) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Habit(HabitError::DuplicateName(_))
            | ApiError::Ledger(LedgerError::DuplicateCompletion(_)) => StatusCode::CONFLICT,
            ApiError::Habit(HabitError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Habit(HabitError::Database(_))
            | ApiError::Ledger(LedgerError::Database(_))
            | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
        }
        let body: ApiResponse<()> = ApiResponse::error(self.to_string());
        (status, Json(body)).into_response()
    }
}
