//! Routes for the completion ledger.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use db::models::habit_completion::HabitCompletion;
use serde::{Deserialize, Serialize};
use services::services::ledger::LedgerService;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct MarkComplete {
    pub notes: Option<String>,
}

/// Mark a habit complete for today. A second call for the same day comes back
/// as 409; the uniqueness lives in the storage layer, so two concurrent calls
/// cannot both succeed.
pub async fn mark_complete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(habit_id): Path<Uuid>,
    payload: Option<axum::Json<MarkComplete>>,
) -> Result<ResponseJson<ApiResponse<HabitCompletion>>, ApiError> {
    let today = Utc::now().date_naive();
    let notes = payload.and_then(|axum::Json(body)| body.notes);
    let completion =
        LedgerService::record_completion(&state.db.pool, habit_id, user_id, today, notes).await?;
    Ok(ResponseJson(ApiResponse::success(completion)))
}

pub async fn list_completions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(habit_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<HabitCompletion>>>, ApiError> {
    let completions =
        LedgerService::completions_for_habit(&state.db.pool, habit_id, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(completions)))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/habits/{habit_id}/completions",
        post(mark_complete).get(list_completions),
    )
}
