//! Habit CRUD with field validation and progress-decorated reads.

use chrono::NaiveDate;
use db::models::{
    category::Category,
    habit::{CreateHabit, Habit, UpdateHabit},
    habit_completion::HabitCompletion,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::progress::{self, HabitProgress};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Error)]
pub enum HabitError {
    #[error("habit not found")]
    NotFound,
    #[error("a habit named '{0}' already exists")]
    DuplicateName(String),
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A habit joined with its recomputed progress values.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct HabitWithProgress {
    #[serde(flatten)]
    #[ts(flatten)]
    pub habit: Habit,
    pub progress: HabitProgress,
}

pub struct HabitService;

impl HabitService {
    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        mut data: CreateHabit,
    ) -> Result<Habit, HabitError> {
        data.name = validated_name(&data.name)?;
        validate_description(data.description.as_deref())?;
        Self::validate_category(pool, user_id, data.category_id).await?;

        let habit = Habit::create(pool, Uuid::new_v4(), user_id, &data)
            .await
            .map_err(|err| map_unique_to_duplicate_name(err, &data.name))?;

        info!(habit_id = %habit.id, name = %habit.name, "created habit");
        Ok(habit)
    }

    pub async fn update(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
        data: UpdateHabit,
    ) -> Result<Habit, HabitError> {
        let existing = Self::owned_habit(pool, habit_id, user_id).await?;

        let name = match data.name {
            Some(name) => validated_name(&name)?,
            None => existing.name.clone(),
        };
        let description = data.description.or(existing.description);
        validate_description(description.as_deref())?;
        let frequency = data.frequency.unwrap_or(existing.frequency);
        let category_id = data.category_id.or(existing.category_id);
        Self::validate_category(pool, user_id, category_id).await?;

        let habit = Habit::update(
            pool,
            existing.id,
            name.clone(),
            description,
            frequency,
            category_id,
        )
        .await
        .map_err(|err| map_unique_to_duplicate_name(err, &name))?;

        Ok(habit)
    }

    /// Soft-remove. The habit and its ledger survive; the name becomes
    /// available to a new active habit.
    pub async fn archive(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), HabitError> {
        let habit = Self::owned_habit(pool, habit_id, user_id).await?;
        Habit::set_active(pool, habit.id, false).await?;
        info!(habit_id = %habit.id, "archived habit");
        Ok(())
    }

    pub async fn get(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<HabitWithProgress, HabitError> {
        let habit = Self::owned_habit(pool, habit_id, user_id).await?;
        let completions = HabitCompletion::find_by_habit_id(pool, habit.id).await?;
        let progress = progress::evaluate(&habit, &completions, today);
        Ok(HabitWithProgress { habit, progress })
    }

    /// All active habits for a user, each with progress recomputed against
    /// `today`. Derived values are never read from storage.
    pub async fn list_with_progress(
        pool: &SqlitePool,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<HabitWithProgress>, HabitError> {
        let habits = Habit::find_active_by_user_id(pool, user_id).await?;

        let mut decorated = Vec::with_capacity(habits.len());
        for habit in habits {
            let completions = HabitCompletion::find_by_habit_id(pool, habit.id).await?;
            let progress = progress::evaluate(&habit, &completions, today);
            decorated.push(HabitWithProgress { habit, progress });
        }
        Ok(decorated)
    }

    async fn owned_habit(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
    ) -> Result<Habit, HabitError> {
        match Habit::find_by_id(pool, habit_id).await? {
            Some(habit) if habit.user_id == user_id => Ok(habit),
            _ => Err(HabitError::NotFound),
        }
    }

    async fn validate_category(
        pool: &SqlitePool,
        user_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<(), HabitError> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        match Category::find_by_id(pool, category_id).await? {
            Some(category) if category.user_id == user_id => Ok(()),
            _ => Err(HabitError::Validation("unknown category".to_string())),
        }
    }
}

fn validated_name(name: &str) -> Result<String, HabitError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HabitError::Validation("habit name is required".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(HabitError::Validation(format!(
            "habit name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: Option<&str>) -> Result<(), HabitError> {
    if let Some(description) = description
        && description.chars().count() > MAX_DESCRIPTION_LEN
    {
        return Err(HabitError::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

fn map_unique_to_duplicate_name(err: sqlx::Error, name: &str) -> HabitError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            HabitError::DuplicateName(name.to_string())
        }
        _ => HabitError::Database(err),
    }
}
