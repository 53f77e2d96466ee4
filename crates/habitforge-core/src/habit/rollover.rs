//! Daily rollover: score yesterday's outcome and prime today's state.
//!
//! There is no scheduler; reconciliation piggybacks on user traffic. Every
//! qualifying request runs the engine over the user's habits before any
//! data is shown. The run is a two-pass sweep against a reference "today"
//! computed once per invocation from a single configured time zone:
//!
//! 1. **Reconcile yesterday**: for each habit that was due yesterday and
//!    left uncompleted, debit the difficulty tier's miss penalty and reset
//!    the streak, then advance the `last_checked` date to yesterday.
//! 2. **Prime today**: clear the completed-today flag for every habit due
//!    today. Habits not due today keep their flag untouched.
//!
//! Both passes are gated on `last_checked < yesterday`: once a habit has
//! been reconciled through yesterday, re-running the sweep within the same
//! calendar day is a no-op. A penalty can be applied at most once per
//! (habit, day), and a completion toggled earlier today survives a repeat
//! run.
//!
//! ## Usage
//! ```rust,ignore
//! use habitforge_core::habit::rollover::RolloverEngine;
//!
//! let engine = RolloverEngine::new();
//! let summary = engine.reconcile_with_store(&db, user_id)?;
//! println!("{}", summary.message());
//! ```

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Habit;
use crate::storage::HabitStore;

/// Default IANA reference zone for day-boundary computation.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Yekaterinburg;

/// Configuration for the rollover engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RolloverConfig {
    /// The zone in which "today" and "yesterday" are derived. Every date in
    /// a single run uses this zone; there is no per-user negotiation.
    pub timezone: Tz,
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
        }
    }
}

impl RolloverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }
}

/// What one rollover run did to one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverOutcome {
    pub habit_id: String,
    pub title: String,
    /// Rating delta debited for a missed due day, if any (always negative).
    pub penalty: Option<i64>,
    /// Whether the streak was reset to zero.
    pub streak_reset: bool,
    /// Watermark written in pass 1, or `None` if the habit was skipped
    /// (not yet started, or already reconciled through yesterday).
    pub advanced_to: Option<NaiveDate>,
    /// Whether pass 2 cleared the completed-today flag.
    pub flag_reset: bool,
}

impl RolloverOutcome {
    fn untouched(habit: &Habit) -> Self {
        Self {
            habit_id: habit.id.clone(),
            title: habit.title.clone(),
            penalty: None,
            streak_reset: false,
            advanced_to: None,
            flag_reset: false,
        }
    }
}

/// Summary of one rollover run over a user's habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverSummary {
    /// Reference date the run was evaluated against.
    pub today: NaiveDate,
    /// Number of habits swept.
    pub habits_seen: usize,
    /// Habits whose watermark advanced in this run.
    pub reconciled: usize,
    /// Missed due days penalized in this run.
    pub penalties_applied: usize,
    /// Net rating delta across all penalties (zero or negative).
    pub rating_delta: i64,
    /// Completed-today flags cleared in pass 2.
    pub flags_reset: usize,
    /// Per-habit detail, one entry per habit swept.
    pub outcomes: Vec<RolloverOutcome>,
}

impl RolloverSummary {
    fn new(today: NaiveDate) -> Self {
        Self {
            today,
            habits_seen: 0,
            reconciled: 0,
            penalties_applied: 0,
            rating_delta: 0,
            flags_reset: 0,
            outcomes: Vec::new(),
        }
    }

    /// Whether the run changed anything at all.
    pub fn has_changes(&self) -> bool {
        self.reconciled > 0 || self.flags_reset > 0
    }

    /// Human-readable summary line.
    pub fn message(&self) -> String {
        if !self.has_changes() {
            format!("All {} habit(s) already up to date.", self.habits_seen)
        } else if self.penalties_applied == 0 {
            format!(
                "Reconciled {} habit(s), no misses to penalize.",
                self.reconciled
            )
        } else {
            format!(
                "Reconciled {} habit(s): {} missed day(s), rating {:+}.",
                self.reconciled, self.penalties_applied, self.rating_delta
            )
        }
    }
}

/// Engine that reconciles each habit's previous day into streak and rating
/// changes and resets today's completion flag.
#[derive(Debug, Clone, Default)]
pub struct RolloverEngine {
    config: RolloverConfig,
}

impl RolloverEngine {
    /// Create an engine with the default reference zone.
    pub fn new() -> Self {
        Self {
            config: RolloverConfig::default(),
        }
    }

    /// Create an engine with custom config.
    pub fn with_config(config: RolloverConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &RolloverConfig {
        &self.config
    }

    /// Today's date in the configured reference zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.timezone).date_naive()
    }

    /// Run both passes over an owned habit list against a fixed `today`.
    ///
    /// Pure: returns the updated habits and a summary of what changed. The
    /// caller is responsible for persisting; [`Self::reconcile_with_store`]
    /// does that. Rating deltas are reported in the summary only, since the
    /// rating counter lives outside the habit entities.
    pub fn reconcile(
        &self,
        habits: Vec<Habit>,
        today: NaiveDate,
    ) -> (Vec<Habit>, RolloverSummary) {
        let mut summary = RolloverSummary::new(today);
        summary.habits_seen = habits.len();

        let Some(yesterday) = today.pred_opt() else {
            // No previous day exists to reconcile.
            summary.outcomes = habits.iter().map(RolloverOutcome::untouched).collect();
            return (habits, summary);
        };

        let mut habits = habits;

        // Pass 1: settle yesterday for every habit before any flag is
        // touched, so the flag each habit is judged on is the one it ended
        // yesterday with.
        for habit in &mut habits {
            let outcome = self.settle_yesterday(habit, today, yesterday);
            if outcome.advanced_to.is_some() {
                summary.reconciled += 1;
            }
            if let Some(penalty) = outcome.penalty {
                summary.penalties_applied += 1;
                summary.rating_delta += penalty;
            }
            summary.outcomes.push(outcome);
        }

        // Pass 2: prime today. Only habits whose watermark advanced in this
        // run are touched; a repeat run on the same day leaves completions
        // made earlier today alone.
        for (habit, outcome) in habits.iter_mut().zip(summary.outcomes.iter_mut()) {
            if outcome.advanced_to.is_some() && habit.is_due(today) {
                habit.completed_today = false;
                outcome.flag_reset = true;
                summary.flags_reset += 1;
            }
        }

        (habits, summary)
    }

    /// Settle one habit's previous day: penalty, streak reset, watermark.
    fn settle_yesterday(
        &self,
        habit: &mut Habit,
        today: NaiveDate,
        yesterday: NaiveDate,
    ) -> RolloverOutcome {
        let mut outcome = RolloverOutcome::untouched(habit);

        let start = habit.recurrence.start.unwrap_or(today);
        if today < start {
            // Not started yet: no watermark write at all.
            return outcome;
        }

        // Already reconciled through yesterday: the whole mutation block is
        // a no-op until the next day boundary.
        if habit.last_checked.is_some_and(|d| d >= yesterday) {
            return outcome;
        }

        if start > yesterday {
            // Started today: too new to have missed a cycle, but the
            // watermark still advances.
            habit.last_checked = Some(yesterday);
            outcome.advanced_to = Some(yesterday);
            return outcome;
        }

        if habit.is_due(yesterday) && !habit.completed_today {
            let points = habit.difficulty.points();
            outcome.penalty = Some(points.penalty);
            outcome.streak_reset = true;
            habit.streak = 0;
            debug!(
                habit_id = %habit.id,
                penalty = points.penalty,
                "missed due day, streak reset"
            );
        }

        habit.last_checked = Some(yesterday);
        outcome.advanced_to = Some(yesterday);
        outcome
    }

    /// Run the rollover for every habit a user owns, persisting through the
    /// store.
    ///
    /// Pass-1 writes (rating, streak, watermark) are flushed for all habits
    /// before any pass-2 flag reset is written, preserving the pass order
    /// end to end. The first storage failure aborts the run and propagates;
    /// writes already applied are not rolled back (at-least-once,
    /// non-transactional across the habit set).
    pub fn reconcile_with_store<S: HabitStore>(
        &self,
        store: &S,
        user_id: i64,
    ) -> Result<RolloverSummary, String> {
        let today = self.today();
        let habits = store.habits_for_user(user_id).map_err(|e| e.to_string())?;
        let (_, summary) = self.reconcile(habits, today);

        for outcome in &summary.outcomes {
            let Some(date) = outcome.advanced_to else {
                continue;
            };
            if let Some(penalty) = outcome.penalty {
                store
                    .add_rating(user_id, penalty)
                    .map_err(|e| e.to_string())?;
                store
                    .set_streak(&outcome.habit_id, 0)
                    .map_err(|e| e.to_string())?;
            }
            store
                .set_last_checked(&outcome.habit_id, date)
                .map_err(|e| e.to_string())?;
        }

        for outcome in &summary.outcomes {
            if outcome.flag_reset {
                store
                    .set_completed_today(&outcome.habit_id, false)
                    .map_err(|e| e.to_string())?;
            }
        }

        info!(
            user_id,
            habits = summary.habits_seen,
            reconciled = summary.reconciled,
            penalties = summary.penalties_applied,
            rating_delta = summary.rating_delta,
            "rollover complete"
        );
        Ok(summary)
    }
}
