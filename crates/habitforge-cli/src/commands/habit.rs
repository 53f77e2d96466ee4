//! Habit management commands for CLI.

use clap::Subcommand;
use habitforge_core::{
    completion, Config, Difficulty, Habit, HabitDb, HabitUpdate, Recurrence, RolloverConfig,
    RolloverEngine,
};

use super::resolve_user;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
        /// Difficulty tier: trivial, easy, medium or hard (default: easy)
        #[arg(long, default_value = "easy")]
        difficulty: String,
        /// First due day (YYYY-MM-DD, default: today)
        #[arg(long)]
        start: Option<String>,
        /// Repeat kind: daily, weekly, monthly or yearly (default: daily)
        #[arg(long, default_value = "daily")]
        repeat: String,
        /// Repeat every N periods (default: 1)
        #[arg(long)]
        every: Option<String>,
        /// Weekday set for weekly habits, comma-separated, Monday = 0
        #[arg(long)]
        days: Option<String>,
        /// Owning user (defaults to the configured user)
        #[arg(long)]
        user: Option<i64>,
    },
    /// List habits (runs the daily reconciliation sweep first)
    List {
        /// User whose habits to list
        #[arg(long)]
        user: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get habit details
    Show {
        /// Habit ID
        id: String,
    },
    /// Update habit fields; omitted fields are left unchanged
    Update {
        /// Habit ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        repeat: Option<String>,
        #[arg(long)]
        every: Option<String>,
        #[arg(long)]
        days: Option<String>,
        #[arg(long)]
        streak: Option<u32>,
    },
    /// Mark today's occurrence done
    Done {
        /// Habit ID
        id: String,
    },
    /// Unmark today's occurrence
    Undone {
        /// Habit ID
        id: String,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = HabitDb::open()?;

    match action {
        HabitAction::Add {
            title,
            notes,
            difficulty,
            start,
            repeat,
            every,
            days,
            user,
        } => {
            let user_id = resolve_user(user, &config);
            let recurrence = Recurrence::from_raw(
                start.as_deref(),
                Some(repeat.as_str()),
                every.as_deref(),
                days.as_deref(),
            );
            let mut habit = Habit::new(
                user_id,
                title,
                Difficulty::parse(&difficulty),
                recurrence,
            );
            if let Some(notes) = notes {
                habit = habit.with_notes(notes);
            }
            db.create_habit(&habit)?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { user, json } => {
            let user_id = resolve_user(user, &config);
            // The sweep runs before anything is shown, the same way the
            // home view settles yesterday before rendering.
            let engine =
                RolloverEngine::with_config(RolloverConfig::new().with_timezone(config.tz()));
            engine
                .reconcile_with_store(&db, user_id)
                .map_err(habitforge_core::CoreError::Custom)?;

            let habits = db.habits_for_user(user_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits yet.");
            } else {
                let today = engine.today();
                for habit in &habits {
                    let due = if habit.is_due(today) {
                        if habit.completed_today {
                            "done today"
                        } else {
                            "due today"
                        }
                    } else {
                        "not due"
                    };
                    println!(
                        "{}  [{}] {} (streak {}, {})",
                        habit.id,
                        habit.difficulty.as_str(),
                        habit.title,
                        habit.streak,
                        due,
                    );
                }
            }
        }
        HabitAction::Show { id } => {
            match db.habit(&id)? {
                Some(habit) => println!("{}", serde_json::to_string_pretty(&habit)?),
                None => println!("Habit not found: {id}"),
            }
        }
        HabitAction::Update {
            id,
            title,
            notes,
            difficulty,
            start,
            repeat,
            every,
            days,
            streak,
        } => {
            let update = HabitUpdate {
                title,
                notes,
                difficulty,
                start_date: start,
                repeat_type: repeat,
                repeat_every: every,
                repeat_days: days,
                streak,
            };
            if update.is_empty() {
                println!("Nothing to update.");
            } else {
                db.update_habit(&id, &update)?;
                match db.habit(&id)? {
                    Some(habit) => println!("{}", serde_json::to_string_pretty(&habit)?),
                    None => println!("Habit not found: {id}"),
                }
            }
        }
        HabitAction::Done { id } => {
            let outcome = completion::toggle_with_store(&db, &id, true)
                .map_err(habitforge_core::CoreError::Custom)?;
            let rating = db.rating(db.habit(&id)?.map(|h| h.user_id).unwrap_or(config.user_id))?;
            println!(
                "Done. Streak {}, rating {:+} -> {}",
                outcome.streak, outcome.rating_delta, rating
            );
        }
        HabitAction::Undone { id } => {
            let outcome = completion::toggle_with_store(&db, &id, false)
                .map_err(habitforge_core::CoreError::Custom)?;
            let rating = db.rating(db.habit(&id)?.map(|h| h.user_id).unwrap_or(config.user_id))?;
            println!(
                "Undone. Streak {}, rating {:+} -> {}",
                outcome.streak, outcome.rating_delta, rating
            );
        }
        HabitAction::Delete { id } => {
            db.delete_habit(&id)?;
            println!("Habit deleted: {id}");
        }
    }
    Ok(())
}
