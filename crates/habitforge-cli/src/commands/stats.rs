//! Rating and statistics commands for CLI.

use clap::Subcommand;
use habitforge_core::{Config, HabitDb, TaskStatus};

use super::resolve_user;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Show a user's rating and counts
    Show {
        /// User to show (defaults to the configured user)
        #[arg(long)]
        user: Option<i64>,
    },
    /// Overwrite a user's rating counter
    SetRating {
        /// New rating value
        value: i64,
        /// User to update (defaults to the configured user)
        #[arg(long)]
        user: Option<i64>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = HabitDb::open()?;

    match action {
        StatsAction::Show { user } => {
            let user_id = resolve_user(user, &config);
            let rating = db.rating(user_id)?;
            let habits = db.habits_for_user(user_id)?;
            let open_tasks = db.tasks_for_user(user_id, Some(TaskStatus::InProgress))?;
            let done_tasks = db.tasks_for_user(user_id, Some(TaskStatus::Completed))?;
            let best_streak = habits.iter().map(|h| h.streak).max().unwrap_or(0);

            println!("User {user_id}");
            println!("  rating:          {rating}");
            println!("  habits:          {}", habits.len());
            println!("  best streak:     {best_streak}");
            println!("  open tasks:      {}", open_tasks.len());
            println!("  completed tasks: {}", done_tasks.len());
        }
        StatsAction::SetRating { value, user } => {
            let user_id = resolve_user(user, &config);
            db.set_rating(user_id, value)?;
            println!("Rating for user {user_id} set to {value}");
        }
    }
    Ok(())
}
