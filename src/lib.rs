//! Plinko - round resolution and payout engine
//!
//! Core modules:
//! - `engine`: Payout tables, slot resolution, wager ledger, rounds and autoplay
//! - `game`: Command dispatch over the engine (the surface the UI talks to)
//! - `physics`: Physics collaborator seam and pyramid geometry
//! - `events`: Outbound notifications for the presentation layer
//! - `platform`: Browser/native platform abstraction
//! - `config`: Tunable gameplay constants

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod game;
pub mod money;
pub mod physics;
pub mod platform;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::GameConfig;
pub use error::PlinkoError;
pub use events::{EventSink, GameEvent};
pub use game::{Command, Game, PlayMode};
pub use money::{Credits, Multiplier};

/// Board geometry constants
pub mod consts {
    /// Fraction of the field width covered by the slot band
    pub const SLOT_BAND_FRACTION: f32 = 0.95;
    /// Left margin of the slot band as a fraction of field width
    pub const SLOT_BAND_START: f32 = 0.025;

    /// Ball radius as a fraction of the horizontal pin gap
    pub const BALL_SIZE_FACTOR: f32 = 0.28;
    /// Spawn height (pixels from the top of the field)
    pub const BALL_SPAWN_Y: f32 = 30.0;
    /// Total spread of the random horizontal spawn offset (pixels)
    pub const LAUNCH_NUDGE_SPREAD: f32 = 10.0;
    /// Total spread of the random initial horizontal velocity
    pub const LAUNCH_VELOCITY_SPREAD: f32 = 2.0;

    /// Pyramid starts this far down the field (fraction of height)
    pub const PYRAMID_TOP: f32 = 0.15;
    /// Pyramid occupies this much of the field height
    pub const PYRAMID_HEIGHT: f32 = 0.65;
    /// Pins in the first (top) row
    pub const FIRST_ROW_PINS: u32 = 3;
    /// Smallest pin radius (pixels)
    pub const MIN_PIN_RADIUS: f32 = 2.0;
    /// Field width divided by this gives the pin radius
    pub const PIN_RADIUS_DIVISOR: f32 = 140.0;
}
