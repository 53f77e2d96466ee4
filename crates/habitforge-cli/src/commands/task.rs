//! One-shot task management commands for CLI.

use chrono::DateTime;
use clap::Subcommand;
use habitforge_core::{task, Config, Difficulty, HabitDb, Task, TaskStatus};

use super::resolve_user;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
        /// Difficulty tier: trivial, easy, medium or hard (default: easy)
        #[arg(long, default_value = "easy")]
        difficulty: String,
        /// Deadline (RFC 3339, e.g. 2026-09-01T18:00:00Z)
        #[arg(long)]
        deadline: Option<String>,
        /// Owning user (defaults to the configured user)
        #[arg(long)]
        user: Option<i64>,
    },
    /// List tasks
    List {
        /// User whose tasks to list
        #[arg(long)]
        user: Option<i64>,
        /// Filter by status (in_progress or completed)
        #[arg(long)]
        status: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task completed and credit its reward
    Complete {
        /// Task ID
        id: String,
    },
    /// Move a completed task back to in-progress and debit its penalty
    Reopen {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = HabitDb::open()?;

    match action {
        TaskAction::Add {
            title,
            notes,
            difficulty,
            deadline,
            user,
        } => {
            let user_id = resolve_user(user, &config);
            let mut new_task = Task::new(user_id, title, Difficulty::parse(&difficulty));
            if let Some(notes) = notes {
                new_task = new_task.with_notes(notes);
            }
            if let Some(raw) = deadline {
                let parsed = DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| format!("invalid deadline '{raw}': {e}"))?;
                new_task = new_task.with_deadline(parsed.to_utc());
            }
            db.create_task(&new_task)?;
            println!("Task created: {}", new_task.id);
            println!("{}", serde_json::to_string_pretty(&new_task)?);
        }
        TaskAction::List { user, status, json } => {
            let user_id = resolve_user(user, &config);
            let status = status.as_deref().map(TaskStatus::parse);
            let tasks = db.tasks_for_user(user_id, status)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for t in &tasks {
                    println!(
                        "{}  [{}] {} ({})",
                        t.id,
                        t.difficulty.as_str(),
                        t.title,
                        t.status.as_str(),
                    );
                }
            }
        }
        TaskAction::Complete { id } => {
            set_status(&db, &id, TaskStatus::Completed)?;
        }
        TaskAction::Reopen { id } => {
            set_status(&db, &id, TaskStatus::InProgress)?;
        }
        TaskAction::Delete { id } => {
            db.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}

fn set_status(
    db: &HabitDb,
    task_id: &str,
    status: TaskStatus,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(found) = db.task(task_id)? else {
        return Err(format!("task not found: {task_id}").into());
    };
    db.set_task_status(task_id, status)?;
    let delta = task::status_change_delta(found.difficulty, status);
    let rating = db.add_rating(found.user_id, delta)?;
    println!(
        "Task {}: rating {:+} -> {}",
        status.as_str(),
        delta,
        rating
    );
    Ok(())
}
