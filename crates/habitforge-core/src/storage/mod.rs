//! Persistence: SQLite habit store and TOML configuration.

mod config;
pub mod habit_db;

pub use config::Config;
pub use habit_db::HabitDb;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::habit::{Habit, HabitUpdate};

/// Returns `~/.config/habitforge[-dev]/` based on HABITFORGE_ENV.
///
/// Set HABITFORGE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITFORGE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitforge-dev")
    } else {
        base_dir.join("habitforge")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Persistence operations the engine needs from a storage backend.
///
/// The rollover and completion operations are written against this trait so
/// they can run over any backend; [`HabitDb`] is the SQLite implementation.
/// Update operations are field-scoped and idempotent: writing the same value
/// twice is harmless.
pub trait HabitStore {
    /// Error type for storage operations.
    type Error: std::fmt::Display;

    /// All habits owned by a user.
    fn habits_for_user(&self, user_id: i64) -> Result<Vec<Habit>, Self::Error>;

    /// A single habit by id.
    fn habit(&self, habit_id: &str) -> Result<Option<Habit>, Self::Error>;

    /// Advance the date through which rollover has been applied.
    fn set_last_checked(&self, habit_id: &str, date: NaiveDate) -> Result<(), Self::Error>;

    /// Overwrite the streak counter.
    fn set_streak(&self, habit_id: &str, streak: u32) -> Result<(), Self::Error>;

    /// Overwrite the completed-today flag.
    fn set_completed_today(&self, habit_id: &str, completed: bool) -> Result<(), Self::Error>;

    /// Apply a field-by-field patch; unset fields are left unchanged.
    fn update_habit(&self, habit_id: &str, update: &HabitUpdate) -> Result<(), Self::Error>;

    /// Delete a habit by id.
    fn delete_habit(&self, habit_id: &str) -> Result<(), Self::Error>;

    /// Current rating counter for a user.
    fn rating(&self, user_id: i64) -> Result<i64, Self::Error>;

    /// Atomically add a delta to the rating counter and return the new value.
    fn add_rating(&self, user_id: i64, delta: i64) -> Result<i64, Self::Error>;

    /// Overwrite the rating counter (explicit admin/reset operation).
    fn set_rating(&self, user_id: i64, value: i64) -> Result<(), Self::Error>;
}
