pub mod config;
pub mod habit;
pub mod reconcile;
pub mod stats;
pub mod task;

use habitforge_core::Config;

/// Resolve the user a command acts as: the explicit flag, or the
/// configured default.
pub fn resolve_user(flag: Option<i64>, config: &Config) -> i64 {
    flag.unwrap_or(config.user_id)
}
