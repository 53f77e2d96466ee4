//! End-to-end checks of the rollover sweep and completion toggle running
//! against the real SQLite store.

use chrono::Duration;

use habitforge_core::{
    completion, task, Difficulty, Habit, HabitDb, Recurrence, RolloverEngine, Task, TaskStatus,
};

const USER: i64 = 1;

#[test]
fn missed_habit_is_scored_through_the_store() {
    let db = HabitDb::open_memory().unwrap();
    let engine = RolloverEngine::new();
    let today = engine.today();
    let yesterday = today.pred_opt().unwrap();

    let mut habit = Habit::new(
        USER,
        "Stretch",
        Difficulty::Medium,
        Recurrence::daily().with_start(today - Duration::days(10)),
    );
    habit.streak = 2;
    db.create_habit(&habit).unwrap();
    assert_eq!(db.rating(USER).unwrap(), 1000);

    let summary = engine.reconcile_with_store(&db, USER).unwrap();
    assert_eq!(summary.penalties_applied, 1);
    assert_eq!(summary.rating_delta, -20);

    let stored = db.habit(&habit.id).unwrap().unwrap();
    assert_eq!(stored.streak, 0);
    assert_eq!(stored.last_checked, Some(yesterday));
    assert!(!stored.completed_today);
    assert_eq!(db.rating(USER).unwrap(), 980);
}

#[test]
fn second_sweep_on_the_same_day_changes_nothing() {
    let db = HabitDb::open_memory().unwrap();
    let engine = RolloverEngine::new();
    let today = engine.today();

    let habit = Habit::new(
        USER,
        "Meditate",
        Difficulty::Hard,
        Recurrence::daily().with_start(today - Duration::days(3)),
    );
    db.create_habit(&habit).unwrap();

    engine.reconcile_with_store(&db, USER).unwrap();
    let after_first = db.rating(USER).unwrap();

    // Complete today's occurrence, then sweep again: the completion and the
    // rating must both survive.
    let outcome = completion::toggle_with_store(&db, &habit.id, true).unwrap();
    assert_eq!(outcome.rating_delta, 60);

    let summary = engine.reconcile_with_store(&db, USER).unwrap();
    assert_eq!(summary.penalties_applied, 0);
    assert_eq!(summary.flags_reset, 0);

    let stored = db.habit(&habit.id).unwrap().unwrap();
    assert!(stored.completed_today);
    assert_eq!(db.rating(USER).unwrap(), after_first + 60);
}

#[test]
fn toggle_round_trip_through_the_store() {
    let db = HabitDb::open_memory().unwrap();
    let mut habit = Habit::new(USER, "Read", Difficulty::Easy, Recurrence::daily());
    habit.streak = 3;
    db.create_habit(&habit).unwrap();

    let on = completion::toggle_with_store(&db, &habit.id, true).unwrap();
    let off = completion::toggle_with_store(&db, &habit.id, false).unwrap();

    assert_eq!(on.rating_delta + off.rating_delta, 0);
    let stored = db.habit(&habit.id).unwrap().unwrap();
    assert_eq!(stored.streak, 3);
    assert!(!stored.completed_today);
    assert_eq!(db.rating(USER).unwrap(), 1000);
}

#[test]
fn toggling_a_missing_habit_fails() {
    let db = HabitDb::open_memory().unwrap();
    let err = completion::toggle_with_store(&db, "ghost", true).unwrap_err();
    assert!(err.contains("ghost"));
}

#[test]
fn task_completion_feeds_the_same_rating_counter() {
    let db = HabitDb::open_memory().unwrap();
    let t = Task::new(USER, "Ship release", Difficulty::Trivial);
    db.create_task(&t).unwrap();

    db.set_task_status(&t.id, TaskStatus::Completed).unwrap();
    db.add_rating(USER, task::status_change_delta(t.difficulty, TaskStatus::Completed))
        .unwrap();
    assert_eq!(db.rating(USER).unwrap(), 1010);

    db.set_task_status(&t.id, TaskStatus::InProgress).unwrap();
    db.add_rating(USER, task::status_change_delta(t.difficulty, TaskStatus::InProgress))
        .unwrap();
    assert_eq!(db.rating(USER).unwrap(), 980);
}
