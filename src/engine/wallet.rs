//! Balance and bet bookkeeping
//!
//! The balance only moves through `debit`, `credit` and `reset_balance`; the
//! bet only moves within the configured bounds.

use serde::{Deserialize, Serialize};

use super::payout::RowCount;
use crate::config::GameConfig;
use crate::error::PlinkoError;
use crate::money::Credits;

/// Bet control direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetDirection {
    Up,
    Down,
}

/// Which end of the bet range to jump to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetBound {
    Min,
    Max,
}

/// Bet range and increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    pub min: Credits,
    pub max: Credits,
    pub step: Credits,
}

impl BetLimits {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            min: config.min_bet,
            max: config.max_bet,
            step: config.bet_step,
        }
    }

    fn clamp(&self, bet: Credits) -> Credits {
        bet.clamp(self.min, self.max)
    }
}

/// Player wallet, current bet and board size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagerState {
    balance: Credits,
    current_bet: Credits,
    rows: RowCount,
    initial_balance: Credits,
    limits: BetLimits,
    row_choices: Vec<u8>,
}

impl WagerState {
    pub fn new(config: &GameConfig) -> Result<Self, PlinkoError> {
        config.validate()?;
        Ok(Self {
            balance: config.initial_balance,
            current_bet: config.default_bet,
            rows: RowCount::new(config.default_rows)?,
            initial_balance: config.initial_balance,
            limits: BetLimits::from_config(config),
            row_choices: config.row_choices.clone(),
        })
    }

    pub fn balance(&self) -> Credits {
        self.balance
    }

    pub fn current_bet(&self) -> Credits {
        self.current_bet
    }

    pub fn rows(&self) -> RowCount {
        self.rows
    }

    pub fn limits(&self) -> BetLimits {
        self.limits
    }

    pub fn can_afford(&self, bet: Credits) -> bool {
        self.balance >= bet
    }

    /// Take a wager out of the balance, returning the new balance
    pub fn debit(&mut self, bet: Credits) -> Result<Credits, PlinkoError> {
        self.balance = self
            .balance
            .checked_sub(bet)
            .ok_or(PlinkoError::InsufficientFunds {
                balance: self.balance,
                bet,
            })?;
        Ok(self.balance)
    }

    /// Pay into the balance (zero is fine), returning the new balance
    pub fn credit(&mut self, amount: Credits) -> Result<Credits, PlinkoError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(PlinkoError::BalanceOverflow)?;
        Ok(self.balance)
    }

    /// Step the bet once; returns false when already at the bound
    pub fn adjust_bet(&mut self, direction: BetDirection) -> bool {
        let stepped = match direction {
            BetDirection::Up => self
                .current_bet
                .checked_add(self.limits.step)
                .unwrap_or(self.limits.max),
            BetDirection::Down => self
                .current_bet
                .checked_sub(self.limits.step)
                .unwrap_or(self.limits.min),
        };
        let next = self.limits.clamp(stepped);
        let changed = next != self.current_bet;
        self.current_bet = next;
        changed
    }

    pub fn set_bet_to_bound(&mut self, bound: BetBound) {
        self.current_bet = match bound {
            BetBound::Min => self.limits.min,
            BetBound::Max => self.limits.max,
        };
    }

    pub fn reset_balance(&mut self) {
        self.balance = self.initial_balance;
    }

    /// Switch pyramid size; state is untouched if `rows` is not on offer
    pub fn set_rows(&mut self, rows: u8) -> Result<RowCount, PlinkoError> {
        let validated = RowCount::new(rows)?;
        if !self.row_choices.contains(&rows) {
            return Err(PlinkoError::UnsupportedRows(rows));
        }
        self.rows = validated;
        Ok(validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet() -> WagerState {
        WagerState::new(&GameConfig::default()).expect("default config")
    }

    #[test]
    fn test_debit_and_credit() {
        let mut w = wallet();
        assert_eq!(w.debit(Credits::from_units(10)).unwrap(), Credits::from_units(990));
        assert_eq!(w.credit(Credits::from_units(2)).unwrap(), Credits::from_units(992));
        assert_eq!(w.credit(Credits::ZERO).unwrap(), Credits::from_units(992));
    }

    #[test]
    fn test_debit_refused_leaves_balance() {
        let mut w = wallet();
        let err = w.debit(Credits::from_units(1001)).unwrap_err();
        assert!(matches!(err, PlinkoError::InsufficientFunds { .. }));
        assert_eq!(w.balance(), Credits::from_units(1000));

        // Exact balance is affordable
        assert!(w.can_afford(Credits::from_units(1000)));
        assert_eq!(w.debit(Credits::from_units(1000)).unwrap(), Credits::ZERO);
    }

    #[test]
    fn test_adjust_bet_steps_and_clamps() {
        let mut w = wallet();
        assert!(w.adjust_bet(BetDirection::Up));
        assert_eq!(w.current_bet(), Credits::from_units(15));
        assert!(w.adjust_bet(BetDirection::Down));
        assert!(w.adjust_bet(BetDirection::Down));
        assert_eq!(w.current_bet(), Credits::from_units(5));

        // At min: no-op
        assert!(!w.adjust_bet(BetDirection::Down));
        assert_eq!(w.current_bet(), Credits::from_units(5));
    }

    #[test]
    fn test_adjust_bet_at_max_is_noop() {
        let mut w = wallet();
        w.set_bet_to_bound(BetBound::Max);
        assert_eq!(w.current_bet(), Credits::from_units(1000));
        assert!(!w.adjust_bet(BetDirection::Up));
        assert_eq!(w.current_bet(), Credits::from_units(1000));
    }

    #[test]
    fn test_adjust_bet_off_grid_clamps_to_bound() {
        let config = GameConfig {
            max_bet: Credits::from_units(12),
            ..Default::default()
        };
        let mut w = WagerState::new(&config).unwrap();
        assert!(w.adjust_bet(BetDirection::Up));
        assert_eq!(w.current_bet(), Credits::from_units(12));
    }

    #[test]
    fn test_reset_balance() {
        let mut w = wallet();
        w.debit(Credits::from_units(600)).unwrap();
        w.reset_balance();
        assert_eq!(w.balance(), Credits::from_units(1000));
    }

    #[test]
    fn test_set_rows() {
        let mut w = wallet();
        assert_eq!(w.set_rows(12).unwrap().get(), 12);
        assert!(matches!(w.set_rows(9), Err(PlinkoError::UnsupportedRows(9))));
        assert_eq!(w.rows().get(), 12);
    }

    #[test]
    fn test_set_rows_respects_choices() {
        let config = GameConfig {
            row_choices: vec![12, 16],
            ..Default::default()
        };
        let mut w = WagerState::new(&config).unwrap();
        assert!(w.set_rows(14).is_err());
        assert_eq!(w.rows().get(), 16);
    }
}
