//! One-shot tasks and their completion scoring.
//!
//! Tasks are single to-dos, not recurring habits: they carry a status
//! instead of a recurrence rule and never participate in the daily
//! rollover. Completing a task credits its tier's reward; moving it back
//! to in-progress debits the tier's miss penalty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::habit::scoring::Difficulty;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Parse a stored status string; anything unrecognized is in-progress.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "completed" => TaskStatus::Completed,
            _ => TaskStatus::InProgress,
        }
    }

    /// Storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// A one-shot task owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub difficulty: Difficulty,
    pub status: TaskStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a fresh in-progress task.
    pub fn new(user_id: i64, title: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title: title.into(),
            notes: None,
            difficulty,
            status: TaskStatus::InProgress,
            deadline: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Rating delta for moving a task to `status`.
///
/// Completion credits the tier's reward; reverting to in-progress debits
/// the tier's miss penalty. Unlike the habit completion toggle, a revert is
/// scored as a miss rather than as an undo.
pub fn status_change_delta(difficulty: Difficulty, status: TaskStatus) -> i64 {
    let points = difficulty.points();
    match status {
        TaskStatus::Completed => points.reward,
        TaskStatus::InProgress => points.penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_is_in_progress() {
        let task = Task::new(1, "File taxes", Difficulty::Hard);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn completion_credits_reward() {
        assert_eq!(status_change_delta(Difficulty::Medium, TaskStatus::Completed), 40);
        assert_eq!(status_change_delta(Difficulty::Trivial, TaskStatus::Completed), 10);
    }

    #[test]
    fn revert_debits_miss_penalty() {
        assert_eq!(
            status_change_delta(Difficulty::Medium, TaskStatus::InProgress),
            -20
        );
        assert_eq!(
            status_change_delta(Difficulty::Trivial, TaskStatus::InProgress),
            -30
        );
    }

    #[test]
    fn unknown_status_parses_as_in_progress() {
        assert_eq!(TaskStatus::parse("done"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse("completed"), TaskStatus::Completed);
    }
}
