use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// How often a habit is expected to be completed.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateHabit {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateHabit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub category_id: Option<Uuid>,
}

const HABIT_COLUMNS: &str =
    "id, user_id, name, description, frequency, category_id, is_active, created_at, updated_at";

impl Habit {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Active habits for one owner, newest first.
    pub async fn find_active_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits
             WHERE user_id = $1 AND is_active = 1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Insert a habit. The partial unique index on `(user_id, name)` over
    /// active rows rejects duplicate active names with a unique violation.
    pub async fn create(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
        data: &CreateHabit,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            "INSERT INTO habits (id, user_id, name, description, frequency, category_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {HABIT_COLUMNS}"
        ))
        .bind(habit_id)
        .bind(user_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.frequency)
        .bind(data.category_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        name: String,
        description: Option<String>,
        frequency: Frequency,
        category_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Habit>(&format!(
            "UPDATE habits
             SET name = $2, description = $3, frequency = $4, category_id = $5,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {HABIT_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(frequency)
        .bind(category_id)
        .fetch_one(pool)
        .await
    }

    /// Soft-remove: the habit keeps its rows but drops out of active listings
    /// and releases its name for reuse.
    pub async fn set_active(
        pool: &SqlitePool,
        id: Uuid,
        is_active: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE habits SET is_active = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Physical delete; completions go with it via the foreign-key cascade.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
