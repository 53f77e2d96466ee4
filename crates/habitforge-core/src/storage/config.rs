//! TOML-based application configuration.
//!
//! Stores the reference time zone used for every day-boundary computation
//! and the user the CLI operates as. Configuration lives at
//! `~/.config/habitforge/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use chrono_tz::Tz;

use super::data_dir;
use crate::habit::rollover::DEFAULT_TIMEZONE;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitforge/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA name of the reference zone. All "today"/"yesterday" math in a
    /// run uses this single zone.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// User the CLI acts as when no explicit user is given.
    #[serde(default = "default_user_id")]
    pub user_id: i64,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.name().to_string()
}

fn default_user_id() -> i64 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            user_id: default_user_id(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// The configured zone, falling back to the default when the stored
    /// name is not a known IANA zone.
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(DEFAULT_TIMEZONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timezone, "Asia/Yekaterinburg");
        assert_eq!(parsed.user_id, 1);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.timezone, "Asia/Yekaterinburg");
        assert_eq!(parsed.user_id, 1);
    }

    #[test]
    fn tz_resolves_known_zone() {
        let cfg = Config {
            timezone: "Europe/Berlin".to_string(),
            user_id: 1,
        };
        assert_eq!(cfg.tz(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn tz_falls_back_on_unknown_zone() {
        let cfg = Config {
            timezone: "Mars/Olympus_Mons".to_string(),
            user_id: 1,
        };
        assert_eq!(cfg.tz(), DEFAULT_TIMEZONE);
    }
}
