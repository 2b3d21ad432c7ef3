pub mod category;
pub mod habit;
pub mod habit_completion;
