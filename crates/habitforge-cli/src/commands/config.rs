//! Configuration management commands for CLI.

use clap::Subcommand;
use habitforge_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the full configuration
    Show,
    /// Set the reference time zone (IANA name)
    SetTimezone {
        /// Zone name, e.g. Asia/Yekaterinburg
        name: String,
    },
    /// Set the default user the CLI acts as
    SetUser {
        /// User id
        id: i64,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            println!("timezone = {}", config.timezone);
            println!("user_id  = {}", config.user_id);
        }
        ConfigAction::SetTimezone { name } => {
            if name.parse::<chrono_tz::Tz>().is_err() {
                return Err(format!("unknown time zone: {name}").into());
            }
            let mut config = Config::load_or_default();
            config.timezone = name;
            config.save()?;
            println!("timezone = {}", config.timezone);
        }
        ConfigAction::SetUser { id } => {
            let mut config = Config::load_or_default();
            config.user_id = id;
            config.save()?;
            println!("user_id = {}", config.user_id);
        }
    }
    Ok(())
}
