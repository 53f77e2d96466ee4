//! Difficulty tiers and the reward/penalty table.
//!
//! Every habit and task carries a difficulty tier. Completing an occurrence
//! earns the tier's reward; missing a due occurrence costs the tier's
//! penalty. Harder tiers reward more but penalize less per occurrence, so a
//! slip on a hard commitment does not wipe out the progress it represents.

use serde::{Deserialize, Serialize};

/// Difficulty tier of a habit or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Trivial,
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a stored tier string. Unknown or empty input falls back to
    /// [`Difficulty::Easy`]; tier fields never reject.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "trivial" => Difficulty::Trivial,
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }

    /// Storage representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Trivial => "trivial",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// The rating points attached to this tier.
    pub fn points(&self) -> Points {
        match self {
            Difficulty::Trivial => Points { reward: 10, penalty: -30 },
            Difficulty::Easy => Points { reward: 25, penalty: -25 },
            Difficulty::Medium => Points { reward: 40, penalty: -20 },
            Difficulty::Hard => Points { reward: 60, penalty: -15 },
        }
    }
}

/// Rating deltas for one occurrence of a tier.
///
/// `reward` is credited on completion; `penalty` (always negative) is
/// applied when a due occurrence is missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Points {
    pub reward: i64,
    pub penalty: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_table_values() {
        assert_eq!(
            Difficulty::Trivial.points(),
            Points { reward: 10, penalty: -30 }
        );
        assert_eq!(
            Difficulty::Easy.points(),
            Points { reward: 25, penalty: -25 }
        );
        assert_eq!(
            Difficulty::Medium.points(),
            Points { reward: 40, penalty: -20 }
        );
        assert_eq!(
            Difficulty::Hard.points(),
            Points { reward: 60, penalty: -15 }
        );
    }

    #[test]
    fn harder_tiers_reward_more_and_penalize_less() {
        let tiers = [
            Difficulty::Trivial,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
        ];
        for pair in tiers.windows(2) {
            let (lo, hi) = (pair[0].points(), pair[1].points());
            assert!(hi.reward > lo.reward);
            assert!(hi.penalty > lo.penalty, "penalty magnitude shrinks");
        }
    }

    #[test]
    fn unknown_tier_falls_back_to_easy() {
        assert_eq!(Difficulty::parse("heroic"), Difficulty::Easy);
        assert_eq!(Difficulty::parse(""), Difficulty::Easy);
        assert_eq!(Difficulty::parse("Hard"), Difficulty::Easy);
    }

    #[test]
    fn parse_round_trips_known_tiers() {
        for tier in [
            Difficulty::Trivial,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
        ] {
            assert_eq!(Difficulty::parse(tier.as_str()), tier);
        }
    }
}
