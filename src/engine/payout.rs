//! Payout schedules per pyramid size
//!
//! Each table is mirror-symmetric: cheap slots in the middle (house edge),
//! jackpots on the edges. Values are in hundredths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlinkoError;
use crate::money::Multiplier;

const fn m(hundredths: u32) -> Multiplier {
    Multiplier::from_hundredths(hundredths)
}

const ROWS_10: [Multiplier; 11] = [
    m(2500), m(500), m(200), m(100), m(50), m(20), m(50), m(100), m(200), m(500), m(2500),
];

const ROWS_11: [Multiplier; 12] = [
    m(5000), m(1000), m(300), m(150), m(50), m(20), m(20), m(50), m(150), m(300), m(1000),
    m(5000),
];

const ROWS_12: [Multiplier; 13] = [
    m(10000), m(2000), m(500), m(200), m(100), m(30), m(20), m(30), m(100), m(200), m(500),
    m(2000), m(10000),
];

const ROWS_13: [Multiplier; 14] = [
    m(15000), m(3000), m(800), m(300), m(120), m(50), m(20), m(20), m(50), m(120), m(300),
    m(800), m(3000), m(15000),
];

const ROWS_14: [Multiplier; 15] = [
    m(20000), m(5000), m(1200), m(400), m(150), m(50), m(20), m(20), m(20), m(50), m(150),
    m(400), m(1200), m(5000), m(20000),
];

// 15 slots, not 16: this is the shipped table and payouts depend on it.
const ROWS_15: [Multiplier; 15] = [
    m(30000), m(8000), m(2000), m(600), m(200), m(80), m(20), m(20), m(20), m(80), m(200),
    m(600), m(2000), m(8000), m(30000),
];

const ROWS_16: [Multiplier; 17] = [
    m(50000), m(12000), m(3000), m(1000), m(300), m(100), m(40), m(20), m(20), m(20), m(40),
    m(100), m(300), m(1000), m(3000), m(12000), m(50000),
];

/// Multiplier schedule for a row count
pub fn multipliers_for(rows: u8) -> Result<&'static [Multiplier], PlinkoError> {
    match rows {
        10 => Ok(&ROWS_10),
        11 => Ok(&ROWS_11),
        12 => Ok(&ROWS_12),
        13 => Ok(&ROWS_13),
        14 => Ok(&ROWS_14),
        15 => Ok(&ROWS_15),
        16 => Ok(&ROWS_16),
        _ => Err(PlinkoError::UnsupportedRows(rows)),
    }
}

/// A pyramid size with a payout table behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RowCount(u8);

impl RowCount {
    pub const MIN: u8 = 10;
    pub const MAX: u8 = 16;

    pub fn new(rows: u8) -> Result<Self, PlinkoError> {
        multipliers_for(rows)?;
        Ok(Self(rows))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn multipliers(self) -> &'static [Multiplier] {
        match multipliers_for(self.0) {
            Ok(table) => table,
            // Construction is validated
            Err(_) => unreachable!("RowCount({}) has no payout table", self.0),
        }
    }

    pub fn slot_count(self) -> usize {
        self.multipliers().len()
    }
}

impl TryFrom<u8> for RowCount {
    type Error = PlinkoError;

    fn try_from(rows: u8) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<RowCount> for u8 {
    fn from(rows: RowCount) -> u8 {
        rows.0
    }
}

impl fmt::Display for RowCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_floats(rows: u8) -> Vec<f64> {
        multipliers_for(rows)
            .expect("supported")
            .iter()
            .map(|m| m.as_f64())
            .collect()
    }

    #[test]
    fn test_tables_verbatim() {
        assert_eq!(
            as_floats(10),
            vec![25.0, 5.0, 2.0, 1.0, 0.5, 0.2, 0.5, 1.0, 2.0, 5.0, 25.0]
        );
        assert_eq!(
            as_floats(13),
            vec![150.0, 30.0, 8.0, 3.0, 1.2, 0.5, 0.2, 0.2, 0.5, 1.2, 3.0, 8.0, 30.0, 150.0]
        );
        assert_eq!(
            as_floats(16),
            vec![
                500.0, 120.0, 30.0, 10.0, 3.0, 1.0, 0.4, 0.2, 0.2, 0.2, 0.4, 1.0, 3.0, 10.0, 30.0,
                120.0, 500.0
            ]
        );
    }

    #[test]
    fn test_slot_counts() {
        let lens: Vec<usize> = (10..=16)
            .map(|r| RowCount::new(r).expect("supported").slot_count())
            .collect();
        assert_eq!(lens, vec![11, 12, 13, 14, 15, 15, 17]);
    }

    #[test]
    fn test_tables_symmetric_with_house_edge() {
        for rows in RowCount::MIN..=RowCount::MAX {
            let table = multipliers_for(rows).expect("supported");
            let n = table.len();
            for i in 0..n {
                assert_eq!(table[i], table[n - 1 - i], "rows={rows} i={i}");
                assert!(table[i].hundredths() > 0);
            }
            assert!(table[n / 2] < Multiplier::ONE, "rows={rows} centre");
            assert!(table[0] >= Multiplier::ONE, "rows={rows} edge");
        }
    }

    #[test]
    fn test_unsupported_rows() {
        for rows in [0, 9, 17, 255] {
            assert!(matches!(
                multipliers_for(rows),
                Err(PlinkoError::UnsupportedRows(r)) if r == rows
            ));
            assert!(RowCount::new(rows).is_err());
        }
    }

    #[test]
    fn test_row_count_serde() {
        let rows: RowCount = serde_json::from_str("12").expect("valid");
        assert_eq!(rows.get(), 12);
        assert!(serde_json::from_str::<RowCount>("20").is_err());
    }
}
