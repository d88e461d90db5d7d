//! Round engine
//!
//! All money and scheduling logic lives here. This module must stay free of
//! rendering and platform dependencies:
//! - Time is passed in as milliseconds, never read
//! - Randomness comes from a seeded RNG only
//! - Physics and UI are reached through traits

pub mod autoplay;
pub mod payout;
pub mod resolver;
pub mod round;
pub mod wallet;

pub use autoplay::{AutoplayBudget, AutoplayController, TickOutcome, TimerToken};
pub use payout::{RowCount, multipliers_for};
pub use resolver::{resolve, slot_center};
pub use round::{InFlightBall, RoundEngine, RoundResult};
pub use wallet::{BetBound, BetDirection, BetLimits, WagerState};
