//! The completion ledger: append-only (per day) record of habit completions.
//!
//! Idempotency at calendar-date granularity is the ledger's one correctness
//! guarantee, and it lives in the storage layer: the unique index on
//! `(habit_id, completion_date)` means that of two concurrent "mark complete"
//! requests exactly one insert succeeds and the other surfaces as
//! [`LedgerError::DuplicateCompletion`]. No read-then-write check exists here.

use chrono::NaiveDate;
use db::models::{habit::Habit, habit_completion::HabitCompletion};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("habit not found")]
    HabitNotFound,
    #[error("habit already completed for {0}")]
    DuplicateCompletion(NaiveDate),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct LedgerService;

impl LedgerService {
    /// Record that `habit_id` was completed on `date`.
    ///
    /// The habit must exist, be active, and be owned by `user_id`; anything
    /// else is reported as [`LedgerError::HabitNotFound`] so callers cannot
    /// probe for other users' habits. A completion row always carries the same
    /// owner as its parent habit.
    pub async fn record_completion(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<HabitCompletion, LedgerError> {
        let habit = Self::owned_habit(pool, habit_id, user_id).await?;
        // Archived habits no longer accept completions.
        if !habit.is_active {
            return Err(LedgerError::HabitNotFound);
        }

        let completion =
            HabitCompletion::create(pool, Uuid::new_v4(), habit.id, user_id, date, notes)
                .await
                .map_err(|err| match err.as_database_error() {
                    Some(db_err) if db_err.is_unique_violation() => {
                        LedgerError::DuplicateCompletion(date)
                    }
                    _ => LedgerError::Database(err),
                })?;

        info!(
            habit_id = %habit.id,
            completion_date = %date,
            "recorded completion"
        );

        Ok(completion)
    }

    /// Full completion history for an owned habit, most recent first.
    pub async fn completions_for_habit(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<HabitCompletion>, LedgerError> {
        let habit = Self::owned_habit(pool, habit_id, user_id).await?;
        Ok(HabitCompletion::find_by_habit_id(pool, habit.id).await?)
    }

    /// Physically delete a habit and, via the foreign-key cascade, every one
    /// of its completions. A single statement, so partial failure cannot leave
    /// orphaned completion rows.
    pub async fn remove_habit_cascade(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), LedgerError> {
        let habit = Self::owned_habit(pool, habit_id, user_id).await?;

        let deleted = Habit::delete(pool, habit.id).await?;
        info!(habit_id = %habit.id, rows = deleted, "deleted habit with completions");

        Ok(())
    }

    /// Resolve a habit the caller is allowed to touch. Habits owned by other
    /// users are reported exactly like missing ones.
    async fn owned_habit(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
    ) -> Result<Habit, LedgerError> {
        match Habit::find_by_id(pool, habit_id).await? {
            Some(habit) if habit.user_id == user_id => Ok(habit),
            _ => Err(LedgerError::HabitNotFound),
        }
    }
}
