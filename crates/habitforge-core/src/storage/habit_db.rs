//! SQLite-based storage for habits, tasks, and per-user rating counters.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, HabitStore};
use crate::error::DatabaseError;
use crate::habit::recurrence::{
    normalize_interval, normalize_interval_int, normalize_weekdays, parse_start_date, Recurrence,
    RepeatKind,
};
use crate::habit::scoring::Difficulty;
use crate::habit::{Habit, HabitUpdate};
use crate::task::{Task, TaskStatus};

/// Rating every user starts from.
const INITIAL_RATING: i64 = 1000;

// === Helper Functions ===

/// Format a calendar date for database storage.
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a weekday set for database storage ("0,2,4").
fn format_weekdays(weekdays: &std::collections::BTreeSet<u8>) -> String {
    weekdays
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse datetime from RFC3339 string with fallback to current time.
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Read the stored interval, which may be an integer, text, or missing.
/// Every shape is coerced into a usable count.
fn interval_from_column(value: ValueRef<'_>) -> u32 {
    match value {
        ValueRef::Integer(n) => normalize_interval_int(Some(n)),
        ValueRef::Text(t) => normalize_interval(std::str::from_utf8(t).ok()),
        _ => 1,
    }
}

/// Build a Habit from a database row.
///
/// This is the single point where loose stored fields (dates, kinds,
/// intervals, weekday sets, tiers) are normalized into validated values;
/// nothing past this function re-parses.
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let difficulty_str: String = row.get(4)?;
    let streak: i64 = row.get(5)?;
    let start_date: Option<String> = row.get(6)?;
    let repeat_type: Option<String> = row.get(7)?;
    let repeat_days: Option<String> = row.get(9)?;
    let last_checked: Option<String> = row.get(10)?;
    let created_at_str: String = row.get(12)?;

    let recurrence = Recurrence {
        start: parse_start_date(start_date.as_deref()),
        kind: RepeatKind::parse(repeat_type.as_deref()),
        every: interval_from_column(row.get_ref(8)?),
        weekdays: normalize_weekdays(repeat_days.as_deref()),
    };

    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        notes: row.get(3)?,
        difficulty: Difficulty::parse(&difficulty_str),
        recurrence,
        streak: u32::try_from(streak).unwrap_or(0),
        completed_today: row.get(11)?,
        last_checked: parse_start_date(last_checked.as_deref()),
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// Build a Task from a database row.
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let difficulty_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let deadline: Option<String> = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let completed_at: Option<String> = row.get(8)?;

    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        notes: row.get(3)?,
        difficulty: Difficulty::parse(&difficulty_str),
        status: TaskStatus::parse(&status_str),
        deadline: deadline.as_deref().map(parse_datetime_fallback),
        created_at: parse_datetime_fallback(&created_at_str),
        completed_at: completed_at.as_deref().map(parse_datetime_fallback),
    })
}

const HABIT_COLUMNS: &str = "id, user_id, title, notes, difficulty, streak, start_date, \
     repeat_type, repeat_every, repeat_days, last_checked_date, completed_today, created_at";

const TASK_COLUMNS: &str =
    "id, user_id, title, notes, difficulty, status, deadline, created_at, completed_at";

/// SQLite database for habit, task, and rating storage.
///
/// Owns the connection exclusively; `rusqlite::Connection` is not `Sync`,
/// so a handle cannot be shared across threads and per-user sweeps are
/// naturally serialized behind it.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Open the database at `~/.config/habitforge/habitforge.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("habitforge.db");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and ephemeral runs).
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS habits (
                id                TEXT PRIMARY KEY,
                user_id           INTEGER NOT NULL,
                title             TEXT NOT NULL,
                notes             TEXT,
                difficulty        TEXT NOT NULL DEFAULT 'easy',
                streak            INTEGER NOT NULL DEFAULT 0,
                start_date        TEXT,
                repeat_type       TEXT,
                repeat_every      INTEGER NOT NULL DEFAULT 1,
                repeat_days       TEXT,
                last_checked_date TEXT,
                completed_today   INTEGER NOT NULL DEFAULT 0,
                created_at        TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id           TEXT PRIMARY KEY,
                user_id      INTEGER NOT NULL,
                title        TEXT NOT NULL,
                notes        TEXT,
                difficulty   TEXT NOT NULL DEFAULT 'easy',
                status       TEXT NOT NULL DEFAULT 'in_progress',
                deadline     TEXT,
                created_at   TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS user_stats (
                user_id INTEGER PRIMARY KEY,
                rating  INTEGER NOT NULL DEFAULT 1000
            );

            -- Create indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_user_status ON tasks(user_id, status);",
        )?;
        Ok(())
    }

    /// Seed the rating row for a user if it does not exist yet.
    pub fn ensure_user(&self, user_id: i64) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO user_stats (user_id, rating) VALUES (?1, ?2)",
            params![user_id, INITIAL_RATING],
        )?;
        Ok(())
    }

    // ==================== Habit methods ====================

    /// Insert a new habit row.
    pub fn create_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        self.ensure_user(habit.user_id)?;
        self.conn.execute(
            "INSERT INTO habits (id, user_id, title, notes, difficulty, streak, start_date,
                                 repeat_type, repeat_every, repeat_days, last_checked_date,
                                 completed_today, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                habit.id,
                habit.user_id,
                habit.title,
                habit.notes,
                habit.difficulty.as_str(),
                habit.streak,
                habit.recurrence.start.map(format_date),
                habit.recurrence.kind.as_str(),
                habit.recurrence.every,
                format_weekdays(&habit.recurrence.weekdays),
                habit.last_checked.map(format_date),
                habit.completed_today,
                habit.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All habits owned by a user, oldest first.
    pub fn habits_for_user(&self, user_id: i64) -> Result<Vec<Habit>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ?1 ORDER BY created_at"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_habit)?;
        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?);
        }
        Ok(habits)
    }

    /// A single habit by id.
    pub fn habit(&self, habit_id: &str) -> Result<Option<Habit>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"))?;
        Ok(stmt
            .query_row(params![habit_id], row_to_habit)
            .optional()?)
    }

    /// Advance the date through which rollover has been applied.
    pub fn set_last_checked(
        &self,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE habits SET last_checked_date = ?1 WHERE id = ?2",
            params![format_date(date), habit_id],
        )?;
        Ok(())
    }

    /// Overwrite the streak counter.
    pub fn set_streak(&self, habit_id: &str, streak: u32) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE habits SET streak = ?1 WHERE id = ?2",
            params![streak, habit_id],
        )?;
        Ok(())
    }

    /// Overwrite the completed-today flag.
    pub fn set_completed_today(
        &self,
        habit_id: &str,
        completed: bool,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE habits SET completed_today = ?1 WHERE id = ?2",
            params![completed, habit_id],
        )?;
        Ok(())
    }

    /// Apply a field-by-field patch; unset fields are left unchanged.
    ///
    /// Rule fields are stored as the caller supplied them; coercion happens
    /// when rows are read back, so loose input degrades instead of failing.
    pub fn update_habit(
        &self,
        habit_id: &str,
        update: &HabitUpdate,
    ) -> Result<(), DatabaseError> {
        if let Some(title) = &update.title {
            self.conn.execute(
                "UPDATE habits SET title = ?1 WHERE id = ?2",
                params![title, habit_id],
            )?;
        }
        if let Some(notes) = &update.notes {
            self.conn.execute(
                "UPDATE habits SET notes = ?1 WHERE id = ?2",
                params![notes, habit_id],
            )?;
        }
        if let Some(difficulty) = &update.difficulty {
            self.conn.execute(
                "UPDATE habits SET difficulty = ?1 WHERE id = ?2",
                params![difficulty, habit_id],
            )?;
        }
        if let Some(start_date) = &update.start_date {
            self.conn.execute(
                "UPDATE habits SET start_date = ?1 WHERE id = ?2",
                params![start_date, habit_id],
            )?;
        }
        if let Some(repeat_type) = &update.repeat_type {
            self.conn.execute(
                "UPDATE habits SET repeat_type = ?1 WHERE id = ?2",
                params![repeat_type, habit_id],
            )?;
        }
        if let Some(repeat_every) = &update.repeat_every {
            self.conn.execute(
                "UPDATE habits SET repeat_every = ?1 WHERE id = ?2",
                params![repeat_every, habit_id],
            )?;
        }
        if let Some(repeat_days) = &update.repeat_days {
            self.conn.execute(
                "UPDATE habits SET repeat_days = ?1 WHERE id = ?2",
                params![repeat_days, habit_id],
            )?;
        }
        if let Some(streak) = update.streak {
            self.conn.execute(
                "UPDATE habits SET streak = ?1 WHERE id = ?2",
                params![streak, habit_id],
            )?;
        }
        Ok(())
    }

    /// Delete a habit by id.
    pub fn delete_habit(&self, habit_id: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM habits WHERE id = ?1", params![habit_id])?;
        Ok(())
    }

    // ==================== Rating methods ====================

    /// Current rating counter for a user, seeding the row if needed.
    pub fn rating(&self, user_id: i64) -> Result<i64, DatabaseError> {
        self.ensure_user(user_id)?;
        let rating = self.conn.query_row(
            "SELECT rating FROM user_stats WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(rating)
    }

    /// Atomically add a delta to the rating counter and return the new
    /// value. A single SQL statement, so concurrent writers compose.
    pub fn add_rating(&self, user_id: i64, delta: i64) -> Result<i64, DatabaseError> {
        self.ensure_user(user_id)?;
        let rating = self.conn.query_row(
            "UPDATE user_stats SET rating = rating + ?1 WHERE user_id = ?2 RETURNING rating",
            params![delta, user_id],
            |row| row.get(0),
        )?;
        Ok(rating)
    }

    /// Overwrite the rating counter (explicit admin/reset operation).
    pub fn set_rating(&self, user_id: i64, value: i64) -> Result<(), DatabaseError> {
        self.ensure_user(user_id)?;
        self.conn.execute(
            "UPDATE user_stats SET rating = ?1 WHERE user_id = ?2",
            params![value, user_id],
        )?;
        Ok(())
    }

    // ==================== Task methods ====================

    /// Insert a new task row.
    pub fn create_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.ensure_user(task.user_id)?;
        self.conn.execute(
            "INSERT INTO tasks (id, user_id, title, notes, difficulty, status, deadline,
                                created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.id,
                task.user_id,
                task.title,
                task.notes,
                task.difficulty.as_str(),
                task.status.as_str(),
                task.deadline.map(|d| d.to_rfc3339()),
                task.created_at.to_rfc3339(),
                task.completed_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Tasks owned by a user, optionally filtered by status, oldest first.
    pub fn tasks_for_user(
        &self,
        user_id: i64,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, DatabaseError> {
        let mut tasks = Vec::new();
        match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks
                     WHERE user_id = ?1 AND status = ?2 ORDER BY created_at"
                ))?;
                let rows = stmt.query_map(params![user_id, status.as_str()], row_to_task)?;
                for row in rows {
                    tasks.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY created_at"
                ))?;
                let rows = stmt.query_map(params![user_id], row_to_task)?;
                for row in rows {
                    tasks.push(row?);
                }
            }
        }
        Ok(tasks)
    }

    /// A single task by id.
    pub fn task(&self, task_id: &str) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
        Ok(stmt.query_row(params![task_id], row_to_task).optional()?)
    }

    /// Move a task to a status, stamping or clearing `completed_at`.
    pub fn set_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), DatabaseError> {
        let completed_at = match status {
            TaskStatus::Completed => Some(Utc::now().to_rfc3339()),
            TaskStatus::InProgress => None,
        };
        self.conn.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![status.as_str(), completed_at, task_id],
        )?;
        Ok(())
    }

    /// Delete a task by id.
    pub fn delete_task(&self, task_id: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
        Ok(())
    }
}

impl HabitStore for HabitDb {
    type Error = DatabaseError;

    fn habits_for_user(&self, user_id: i64) -> Result<Vec<Habit>, DatabaseError> {
        HabitDb::habits_for_user(self, user_id)
    }

    fn habit(&self, habit_id: &str) -> Result<Option<Habit>, DatabaseError> {
        HabitDb::habit(self, habit_id)
    }

    fn set_last_checked(&self, habit_id: &str, date: NaiveDate) -> Result<(), DatabaseError> {
        HabitDb::set_last_checked(self, habit_id, date)
    }

    fn set_streak(&self, habit_id: &str, streak: u32) -> Result<(), DatabaseError> {
        HabitDb::set_streak(self, habit_id, streak)
    }

    fn set_completed_today(&self, habit_id: &str, completed: bool) -> Result<(), DatabaseError> {
        HabitDb::set_completed_today(self, habit_id, completed)
    }

    fn update_habit(&self, habit_id: &str, update: &HabitUpdate) -> Result<(), DatabaseError> {
        HabitDb::update_habit(self, habit_id, update)
    }

    fn delete_habit(&self, habit_id: &str) -> Result<(), DatabaseError> {
        HabitDb::delete_habit(self, habit_id)
    }

    fn rating(&self, user_id: i64) -> Result<i64, DatabaseError> {
        HabitDb::rating(self, user_id)
    }

    fn add_rating(&self, user_id: i64, delta: i64) -> Result<i64, DatabaseError> {
        HabitDb::add_rating(self, user_id, delta)
    }

    fn set_rating(&self, user_id: i64, value: i64) -> Result<(), DatabaseError> {
        HabitDb::set_rating(self, user_id, value)
    }
}
