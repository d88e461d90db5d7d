//! Gameplay tuning
//!
//! Bet bounds, launch pacing and the row counts offered to the player.
//! Amounts are serialized in cents.

use serde::{Deserialize, Serialize};

use crate::engine::payout::RowCount;
use crate::error::PlinkoError;
use crate::money::Credits;

/// Tunable game constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Wallet ===
    /// Balance on start and after a reset
    pub initial_balance: Credits,
    /// Bet selected on start
    pub default_bet: Credits,
    pub min_bet: Credits,
    pub max_bet: Credits,
    /// Increment used by the bet up/down controls
    pub bet_step: Credits,

    // === Pacing ===
    /// Minimum spacing between two accepted launches
    pub launch_cooldown_ms: u64,
    /// Autoplay tick period
    pub autoplay_interval_ms: u64,
    /// In-flight balls older than this are refunded and removed
    pub stuck_ball_timeout_ms: u64,

    // === Board ===
    /// Row count selected on start
    pub default_rows: u8,
    /// Row counts the player may pick from
    pub row_choices: Vec<u8>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_balance: Credits::from_units(1000),
            default_bet: Credits::from_units(10),
            min_bet: Credits::from_units(5),
            max_bet: Credits::from_units(1000),
            bet_step: Credits::from_units(5),

            launch_cooldown_ms: 400,
            autoplay_interval_ms: 300,
            stuck_ball_timeout_ms: 15_000,

            default_rows: 16,
            row_choices: (RowCount::MIN..=RowCount::MAX).collect(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON config (missing fields take defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, PlinkoError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlinkoError> {
        let invalid = |msg: &str| Err(PlinkoError::InvalidConfig(msg.to_string()));

        if self.min_bet.is_zero() {
            return invalid("min_bet must be greater than zero");
        }
        if self.min_bet > self.max_bet {
            return invalid("min_bet must not exceed max_bet");
        }
        if self.bet_step.is_zero() {
            return invalid("bet_step must be greater than zero");
        }
        if self.default_bet < self.min_bet || self.default_bet > self.max_bet {
            return invalid("default_bet must lie within [min_bet, max_bet]");
        }
        if self.autoplay_interval_ms == 0 {
            return invalid("autoplay_interval_ms must be greater than zero");
        }
        if self.stuck_ball_timeout_ms == 0 {
            return invalid("stuck_ball_timeout_ms must be greater than zero");
        }
        if self.row_choices.is_empty() {
            return invalid("row_choices must not be empty");
        }
        for &rows in &self.row_choices {
            RowCount::new(rows)?;
        }
        RowCount::new(self.default_rows)?;
        if !self.row_choices.contains(&self.default_rows) {
            return invalid("default_rows must be one of row_choices");
        }
        Ok(())
    }

    /// Whether the player may switch to this row count
    pub fn offers_rows(&self, rows: u8) -> bool {
        self.row_choices.contains(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.row_choices, vec![10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(config.initial_balance, Credits::from_units(1000));
    }

    #[test]
    fn test_from_json_partial() {
        let config = GameConfig::from_json(r#"{"launch_cooldown_ms": 0, "default_rows": 12}"#)
            .expect("valid config");
        assert_eq!(config.launch_cooldown_ms, 0);
        assert_eq!(config.default_rows, 12);
        assert_eq!(config.bet_step, Credits::from_units(5));
    }

    #[test]
    fn test_rejects_unsupported_rows() {
        let err = GameConfig::from_json(r#"{"row_choices": [8, 10]}"#).unwrap_err();
        assert!(matches!(err, PlinkoError::UnsupportedRows(8)));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let config = GameConfig {
            min_bet: Credits::from_units(50),
            max_bet: Credits::from_units(10),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PlinkoError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_default_rows_not_offered() {
        let config = GameConfig {
            row_choices: vec![10, 12],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            GameConfig::from_json("{not json"),
            Err(PlinkoError::ConfigParse(_))
        ));
    }
}
