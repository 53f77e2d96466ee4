//! Marking a habit's occurrence done or not done for the current day.
//!
//! Completing credits the difficulty tier's reward and extends the streak.
//! Un-completing undoes a completion: it debits the same reward (not the
//! miss penalty) and steps the streak back down, floored at zero. The engine
//! performs no de-duplication; repeated identical calls keep compounding,
//! and the caller is responsible for not re-sending an applied toggle.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Habit;
use crate::storage::HabitStore;

/// Result of one completion toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub habit_id: String,
    /// The state the flag was set to.
    pub completed: bool,
    /// Streak value after the toggle.
    pub streak: u32,
    /// Rating delta applied: `+reward` on completion, `-reward` on undo.
    pub rating_delta: i64,
}

/// Apply a toggle to an in-memory habit and return the outcome.
///
/// The caller is responsible for persisting the habit and the rating delta;
/// [`toggle_with_store`] does both.
pub fn apply(habit: &mut Habit, completed: bool) -> ToggleOutcome {
    let reward = habit.difficulty.points().reward;
    let rating_delta = if completed {
        habit.completed_today = true;
        habit.streak += 1;
        reward
    } else {
        habit.completed_today = false;
        habit.streak = habit.streak.saturating_sub(1);
        -reward
    };
    ToggleOutcome {
        habit_id: habit.id.clone(),
        completed,
        streak: habit.streak,
        rating_delta,
    }
}

/// Toggle a habit through the persistence collaborator.
///
/// Fetches the habit, applies the toggle, and persists the flag, streak and
/// rating delta. Storage failures propagate; mutations already written stay
/// written.
pub fn toggle_with_store<S: HabitStore>(
    store: &S,
    habit_id: &str,
    completed: bool,
) -> Result<ToggleOutcome, String> {
    let mut habit = store
        .habit(habit_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("habit not found: {habit_id}"))?;

    let user_id = habit.user_id;
    let outcome = apply(&mut habit, completed);

    store
        .set_completed_today(habit_id, outcome.completed)
        .map_err(|e| e.to_string())?;
    store
        .set_streak(habit_id, outcome.streak)
        .map_err(|e| e.to_string())?;
    store
        .add_rating(user_id, outcome.rating_delta)
        .map_err(|e| e.to_string())?;

    debug!(
        habit_id,
        completed,
        streak = outcome.streak,
        rating_delta = outcome.rating_delta,
        "completion toggled"
    );
    Ok(outcome)
}
