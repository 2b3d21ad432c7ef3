use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// One row in the completion ledger: a habit satisfied on one calendar date.
///
/// `completion_date` is the date the habit counts for; `completed_at` is when
/// the row was written. Rows are never updated and are deleted only by the
/// habit cascade.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct HabitCompletion {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub completion_date: NaiveDate,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

const COMPLETION_COLUMNS: &str = "id, habit_id, user_id, completion_date, notes, completed_at";

impl HabitCompletion {
    /// Insert a completion. At most one row may exist per
    /// `(habit_id, completion_date)`; a second insert for the same pair fails
    /// with a unique violation from the storage layer, which makes the
    /// check-then-insert race impossible by construction.
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        habit_id: Uuid,
        user_id: Uuid,
        completion_date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, HabitCompletion>(&format!(
            "INSERT INTO habit_completions (id, habit_id, user_id, completion_date, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COMPLETION_COLUMNS}"
        ))
        .bind(id)
        .bind(habit_id)
        .bind(user_id)
        .bind(completion_date)
        .bind(notes)
        .fetch_one(pool)
        .await
    }

    /// Full history for a habit, most recent date first.
    pub async fn find_by_habit_id(
        pool: &SqlitePool,
        habit_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, HabitCompletion>(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions
             WHERE habit_id = $1
             ORDER BY completion_date DESC"
        ))
        .bind(habit_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_habit_id(pool: &SqlitePool, habit_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM habit_completions WHERE habit_id = $1")
                .bind(habit_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
