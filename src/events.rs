//! Outbound notifications
//!
//! Everything the presentation layer needs to redraw goes through
//! [`EventSink::emit`]. Events serialize as tagged JSON for the web bridge.

use serde::{Deserialize, Serialize};

use crate::engine::autoplay::AutoplayBudget;
use crate::engine::payout::RowCount;
use crate::engine::round::RoundResult;
use crate::money::Credits;
use crate::physics::BallHandle;

/// Why a launch request was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Cooldown,
    InsufficientFunds,
}

/// Why an autoplay session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Player pressed stop (or left auto mode)
    Requested,
    /// Launch budget used up
    Depleted,
    /// Balance could not cover the bet
    InsufficientFunds,
    /// A new session replaced this one
    Restarted,
}

/// Game event for the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    BalanceChanged {
        balance: Credits,
    },
    BetChanged {
        bet: Credits,
    },
    RowsChanged {
        rows: RowCount,
        slot_count: usize,
    },
    RoundResult(RoundResult),
    AutoplayStateChanged {
        running: bool,
        budget: AutoplayBudget,
        #[serde(skip_serializing_if = "Option::is_none")]
        stop_reason: Option<StopReason>,
    },
    LaunchRejected {
        reason: RejectReason,
    },
    /// A ball never left the field and its wager was returned
    BallExpired {
        ball: BallHandle,
        refund: Credits,
    },
}

/// Receiver for game events
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}
