//! Explicit trigger for the daily reconciliation sweep.

use habitforge_core::{Config, CoreError, HabitDb, RolloverConfig, RolloverEngine};

use super::resolve_user;

pub fn run(user: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = HabitDb::open()?;
    let user_id = resolve_user(user, &config);

    let engine = RolloverEngine::with_config(RolloverConfig::new().with_timezone(config.tz()));
    let summary = engine
        .reconcile_with_store(&db, user_id)
        .map_err(CoreError::Custom)?;

    println!("{}", summary.message());
    for outcome in summary.outcomes.iter().filter(|o| o.penalty.is_some()) {
        println!(
            "  missed: {} ({:+})",
            outcome.title,
            outcome.penalty.unwrap_or(0)
        );
    }
    Ok(())
}
