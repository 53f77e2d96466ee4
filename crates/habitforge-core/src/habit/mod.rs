//! Habit entity, recurrence rules, daily rollover and completion scoring.

pub mod completion;
pub mod recurrence;
pub mod rollover;
pub mod scoring;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use self::recurrence::Recurrence;
use self::scoring::Difficulty;

/// A recurring habit owned by one user.
///
/// `streak`, `completed_today` and `last_checked` are the mutable per-day
/// state: the streak counts consecutive completed due-occurrences, the flag
/// tracks today's occurrence, and `last_checked` is the date through which
/// the daily rollover has already been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub difficulty: Difficulty,
    pub recurrence: Recurrence,
    pub streak: u32,
    pub completed_today: bool,
    pub last_checked: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a fresh habit: zero streak, not completed, never reconciled.
    pub fn new(
        user_id: i64,
        title: impl Into<String>,
        difficulty: Difficulty,
        recurrence: Recurrence,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title: title.into(),
            notes: None,
            difficulty,
            recurrence,
            streak: 0,
            completed_today: false,
            last_checked: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether this habit is due on `on` under its recurrence rule.
    pub fn is_due(&self, on: NaiveDate) -> bool {
        self.recurrence.is_due(on)
    }
}

/// Field-by-field habit patch: `None` fields are left unchanged.
///
/// Values are carried as the loose text the caller supplied; coercion into
/// validated rule values happens when the stored row is read back, the same
/// path every stored field takes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub difficulty: Option<String>,
    pub start_date: Option<String>,
    pub repeat_type: Option<String>,
    pub repeat_every: Option<String>,
    pub repeat_days: Option<String>,
    pub streak: Option<u32>,
}

impl HabitUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.notes.is_none()
            && self.difficulty.is_none()
            && self.start_date.is_none()
            && self.repeat_type.is_none()
            && self.repeat_every.is_none()
            && self.repeat_days.is_none()
            && self.streak.is_none()
    }
}
