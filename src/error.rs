//! Engine error type

use thiserror::Error;

use crate::events::RejectReason;
use crate::money::Credits;
use crate::physics::BallHandle;

#[derive(Debug, Error)]
pub enum PlinkoError {
    #[error("unsupported row count {0} (supported: 10..=16)")]
    UnsupportedRows(u8),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("insufficient funds: balance {balance}, bet {bet}")]
    InsufficientFunds { balance: Credits, bet: Credits },
    #[error("launch cooldown active ({remaining_ms}ms remaining)")]
    Cooldown { remaining_ms: u64 },
    #[error("ball {0} is not in flight")]
    UnknownBall(BallHandle),
    #[error("controls are locked while autoplay is running")]
    ControlsLocked,
    #[error("balance overflow")]
    BalanceOverflow,
}

impl PlinkoError {
    /// The launch-rejection reason this error maps to, if it is one
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            PlinkoError::Cooldown { .. } => Some(RejectReason::Cooldown),
            PlinkoError::InsufficientFunds { .. } => Some(RejectReason::InsufficientFunds),
            _ => None,
        }
    }

    /// Whether an active autoplay session must halt after this error
    pub fn stops_autoplay(&self) -> bool {
        matches!(self, PlinkoError::InsufficientFunds { .. })
    }
}
