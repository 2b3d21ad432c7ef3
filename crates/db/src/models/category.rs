use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Presentation-only grouping for habits (name and display color). Categories
/// carry no semantics for completion or progress.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, user_id, name, color, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
        name: String,
        color: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, user_id, name, color)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, name, color, created_at",
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(color)
        .fetch_one(pool)
        .await
    }
}
