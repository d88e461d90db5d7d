//! Currency and payout multipliers
//!
//! Balances are whole cents and multipliers are whole hundredths, so every
//! debit, credit and payout is exact integer arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount of money in cents (never negative)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Credits(u64);

impl Credits {
    pub const ZERO: Credits = Credits(0);

    /// Build from a raw cent count
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Build from whole currency units
    pub const fn from_units(units: u64) -> Self {
        Self(units * 100)
    }

    /// Build from whole currency units, `None` on overflow
    pub const fn checked_from_units(units: u64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Credits) -> Option<Credits> {
        self.0.checked_add(other.0).map(Credits)
    }

    pub fn checked_sub(self, other: Credits) -> Option<Credits> {
        self.0.checked_sub(other.0).map(Credits)
    }

    /// Payout for this wager at the given multiplier (rounded down to the cent)
    ///
    /// `None` if the payout does not fit in a balance.
    pub fn apply(self, multiplier: Multiplier) -> Option<Credits> {
        let cents = u128::from(self.0) * u128::from(multiplier.hundredths()) / 100;
        u64::try_from(cents).ok().map(Credits)
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A slot payout factor, stored in hundredths (0.2 = 20, 25 = 2500)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multiplier(u32);

impl Multiplier {
    /// Break-even factor
    pub const ONE: Multiplier = Multiplier(100);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_partial_recovery() {
        // 10 x 0.2 pays back 2
        let bet = Credits::from_units(10);
        assert_eq!(
            bet.apply(Multiplier::from_hundredths(20)),
            Some(Credits::from_units(2))
        );
    }

    #[test]
    fn test_apply_rounds_down_to_cent() {
        let bet = Credits::from_cents(5);
        // 5c x 0.3 = 1.5c
        assert_eq!(
            bet.apply(Multiplier::from_hundredths(30)),
            Some(Credits::from_cents(1))
        );
    }

    #[test]
    fn test_apply_overflow_is_none() {
        let bet = Credits::from_cents(u64::MAX / 10);
        assert_eq!(bet.apply(Multiplier::from_hundredths(100_000)), None);
        let max = Credits::from_cents(u64::MAX);
        assert_eq!(max.apply(Multiplier::ONE), Some(max));
    }

    #[test]
    fn test_checked_from_units() {
        assert_eq!(Credits::checked_from_units(12), Some(Credits::from_cents(1_200)));
        assert_eq!(Credits::checked_from_units(u64::MAX / 10), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Credits::from_cents(124_005).to_string(), "1240.05");
        assert_eq!(Credits::ZERO.to_string(), "0.00");
        assert_eq!(Multiplier::from_hundredths(150).to_string(), "1.5x");
    }

    #[test]
    fn test_checked_sub_never_negative() {
        let a = Credits::from_units(5);
        assert_eq!(a.checked_sub(Credits::from_units(10)), None);
        assert_eq!(a.checked_sub(a), Some(Credits::ZERO));
    }
}
