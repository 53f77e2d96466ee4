//! # Habitforge Core Library
//!
//! This library provides the core business logic for Habitforge, a gamified
//! habit tracker. It implements a CLI-first philosophy where all operations
//! are available via a standalone CLI binary; any richer frontend is a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Recurrence**: A pure calendar predicate deciding whether a habit is
//!   due on a given date (daily/weekly/monthly/yearly rules with interval
//!   multipliers, month-end clamping and leap-day handling)
//! - **Rollover**: A lazy daily reconciliation sweep, triggered by user
//!   traffic rather than a scheduler, that scores yesterday's misses into
//!   streak and rating changes and primes today's completion flags
//! - **Scoring**: A fixed difficulty-tier table of completion rewards and
//!   miss penalties feeding a per-user rating counter
//! - **Storage**: SQLite-based habit/task/rating persistence and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`Recurrence`]: Normalized recurrence rule with the due-day predicate
//! - [`RolloverEngine`]: The daily reconciliation sweep
//! - [`HabitDb`]: Habit, task, and rating persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod habit;
pub mod storage;
pub mod task;

pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use habit::completion::{self, ToggleOutcome};
pub use habit::recurrence::{Recurrence, RepeatKind};
pub use habit::rollover::{RolloverConfig, RolloverEngine, RolloverOutcome, RolloverSummary};
pub use habit::scoring::{Difficulty, Points};
pub use habit::{Habit, HabitUpdate};
pub use storage::{Config, HabitDb, HabitStore};
pub use task::{Task, TaskStatus};
