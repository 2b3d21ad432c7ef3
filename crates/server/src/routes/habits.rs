//! Routes for habit CRUD and progress reads.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use db::models::habit::{CreateHabit, Habit, UpdateHabit};
use services::services::{
    habits::{HabitService, HabitWithProgress},
    ledger::LedgerService,
    progress::HabitProgress,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

pub async fn create_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    axum::Json(payload): axum::Json<CreateHabit>,
) -> Result<ResponseJson<ApiResponse<Habit>>, ApiError> {
    let habit = HabitService::create(&state.db.pool, user_id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(habit)))
}

/// Active habits with progress recomputed against a single "today" captured
/// once for the whole request.
pub async fn list_habits(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ResponseJson<ApiResponse<Vec<HabitWithProgress>>>, ApiError> {
    let today = Utc::now().date_naive();
    let habits = HabitService::list_with_progress(&state.db.pool, user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(habits)))
}

pub async fn get_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(habit_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<HabitWithProgress>>, ApiError> {
    let today = Utc::now().date_naive();
    let habit = HabitService::get(&state.db.pool, habit_id, user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(habit_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateHabit>,
) -> Result<ResponseJson<ApiResponse<Habit>>, ApiError> {
    let habit = HabitService::update(&state.db.pool, habit_id, user_id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(habit)))
}

/// Soft-remove: the habit drops out of listings but keeps its ledger.
pub async fn archive_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(habit_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    HabitService::archive(&state.db.pool, habit_id, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Physical delete; the storage cascade removes all completions with it.
pub async fn delete_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(habit_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    LedgerService::remove_habit_cascade(&state.db.pool, habit_id, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(habit_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<HabitProgress>>, ApiError> {
    let today = Utc::now().date_naive();
    let habit = HabitService::get(&state.db.pool, habit_id, user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(habit.progress)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/habits", post(create_habit).get(list_habits))
        .route(
            "/habits/{habit_id}",
            get(get_habit).put(update_habit).delete(delete_habit),
        )
        .route("/habits/{habit_id}/archive", post(archive_habit))
        .route("/habits/{habit_id}/progress", get(get_progress))
}
