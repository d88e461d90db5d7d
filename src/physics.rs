//! Physics collaborator seam
//!
//! The engine never integrates trajectories. It asks a [`PhysicsBridge`] to
//! spawn balls and is told where each one left the field. This module also
//! carries the board geometry every bridge needs to agree on, plus a seeded
//! stand-in bridge for headless runs.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::engine::payout::RowCount;
use crate::engine::resolver::slot_center;

/// Opaque identity of an in-flight ball (allocated by the engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallHandle(u64);

impl BallHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Initial conditions for a new ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSpawn {
    pub radius: f32,
    pub origin: Vec2,
    pub velocity: Vec2,
}

impl BallSpawn {
    /// Centered spawn at the top of a field, offset by `nudge` pixels
    pub fn centered(field_width: f32, rows: RowCount, nudge: f32, velocity_x: f32) -> Self {
        Self {
            radius: ball_radius(field_width, rows),
            origin: Vec2::new(field_width / 2.0 + nudge, BALL_SPAWN_Y),
            velocity: Vec2::new(velocity_x, 0.0),
        }
    }
}

/// Horizontal gap between neighbouring pins in the bottom row
pub fn pin_gap(field_width: f32, rows: RowCount) -> f32 {
    field_width * SLOT_BAND_FRACTION / (f32::from(rows.get()) + 2.0)
}

/// Ball radius sized to pass between pins
pub fn ball_radius(field_width: f32, rows: RowCount) -> f32 {
    pin_gap(field_width, rows) * BALL_SIZE_FACTOR
}

/// What the engine needs from the physics side
pub trait PhysicsBridge {
    /// Rebuild the pin pyramid for a new row count
    fn configure_pyramid(&mut self, rows: RowCount);
    /// Drop a ball; its exit must later be reported with the same handle
    fn spawn_ball(&mut self, ball: BallHandle, spawn: BallSpawn);
    /// Forget a ball that will never be resolved
    fn remove_ball(&mut self, ball: BallHandle);
    /// Field width as of the last layout/resize
    fn field_width(&self) -> f32;
}

/// Pin positions for a pyramid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyramidLayout {
    pub pin_radius: f32,
    /// Pin centres, top row first, left to right
    pub pins: Vec<Vec2>,
}

impl PyramidLayout {
    /// Row `i` holds `3 + i` pins, spread over a width that grows toward the
    /// bottom; the pyramid covers 65% of the height starting at 15%.
    pub fn new(rows: RowCount, width: f32, height: f32) -> Self {
        let rows = u32::from(rows.get());
        let pin_radius = (width / PIN_RADIUS_DIVISOR).max(MIN_PIN_RADIUS);
        let bottom_width = width * SLOT_BAND_FRACTION;
        let start_y = height * PYRAMID_TOP;
        let spacing_y = height * PYRAMID_HEIGHT / rows as f32;
        let column_gap = bottom_width / (rows as f32 + 2.0);

        let mut pins = Vec::new();
        for i in 0..rows {
            let row_pins = FIRST_ROW_PINS + i;
            let row_width = (row_pins - 1) as f32 * column_gap;
            let start_x = (width - row_width) / 2.0;
            let spacing_x = row_width / (row_pins - 1).max(1) as f32;
            let y = start_y + i as f32 * spacing_y;

            for j in 0..row_pins {
                pins.push(Vec2::new(start_x + j as f32 * spacing_x, y));
            }
        }

        Self { pin_radius, pins }
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }
}

#[derive(Debug, Clone)]
struct SimulatedBall {
    handle: BallHandle,
    exit_x: f32,
    lands_at_ms: u64,
}

/// Headless stand-in for a physics engine
///
/// Each ball takes a fair left/right step per slot boundary (a Galton walk)
/// and lands in the middle of its slot after a fixed flight time.
#[derive(Debug, Clone)]
pub struct SimulatedDrop {
    rng: Pcg32,
    width: f32,
    rows: Option<RowCount>,
    flight_ms: u64,
    clock_ms: u64,
    in_flight: Vec<SimulatedBall>,
}

impl SimulatedDrop {
    pub fn new(seed: u64, width: f32, flight_ms: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            width,
            rows: None,
            flight_ms,
            clock_ms: 0,
            in_flight: Vec::new(),
        }
    }

    /// Layout change; balls still falling resolve against the new width
    pub fn resize(&mut self, width: f32) {
        let old = self.width;
        self.width = width;
        if old > 0.0 {
            for ball in &mut self.in_flight {
                ball.exit_x *= width / old;
            }
        }
    }

    /// Move the clock forward and return the balls that exited, in landing order
    pub fn advance(&mut self, now_ms: u64) -> Vec<(BallHandle, f32)> {
        self.clock_ms = self.clock_ms.max(now_ms);
        let now = self.clock_ms;
        let (mut landed, falling): (Vec<_>, Vec<_>) = self
            .in_flight
            .drain(..)
            .partition(|b| b.lands_at_ms <= now);
        self.in_flight = falling;

        landed.sort_by_key(|b| (b.lands_at_ms, b.handle));
        landed.into_iter().map(|b| (b.handle, b.exit_x)).collect()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl PhysicsBridge for SimulatedDrop {
    fn configure_pyramid(&mut self, rows: RowCount) {
        self.rows = Some(rows);
    }

    fn spawn_ball(&mut self, ball: BallHandle, spawn: BallSpawn) {
        let Some(rows) = self.rows else {
            log::warn!("Ball {} spawned before the pyramid was configured", ball);
            return;
        };
        let slots = rows.slot_count();

        // Launch offset biases the very first bounce
        let bias = (spawn.origin.x - self.width / 2.0) / LAUNCH_NUDGE_SPREAD * 0.1;
        let mut slot = 0usize;
        for step in 0..slots.saturating_sub(1) {
            let p = if step == 0 { 0.5 + bias } else { 0.5 };
            if self.rng.random::<f32>() < p {
                slot += 1;
            }
        }

        let slot_width = self.width * SLOT_BAND_FRACTION / slots as f32;
        let jitter = (self.rng.random::<f32>() - 0.5) * slot_width * 0.8;
        self.in_flight.push(SimulatedBall {
            handle: ball,
            exit_x: slot_center(slot, self.width, slots) + jitter,
            lands_at_ms: self.clock_ms + self.flight_ms,
        });
    }

    fn remove_ball(&mut self, ball: BallHandle) {
        self.in_flight.retain(|b| b.handle != ball);
    }

    fn field_width(&self) -> f32 {
        self.width
    }
}


#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Bridge double that records every call
    #[derive(Debug, Default)]
    pub struct RecordingPhysics {
        pub width: f32,
        pub configured: Vec<RowCount>,
        pub spawned: Vec<(BallHandle, BallSpawn)>,
        pub removed: Vec<BallHandle>,
    }

    impl RecordingPhysics {
        pub fn new(width: f32) -> Self {
            Self {
                width,
                ..Default::default()
            }
        }
    }

    impl PhysicsBridge for RecordingPhysics {
        fn configure_pyramid(&mut self, rows: RowCount) {
            self.configured.push(rows);
        }

        fn spawn_ball(&mut self, ball: BallHandle, spawn: BallSpawn) {
            self.spawned.push((ball, spawn));
        }

        fn remove_ball(&mut self, ball: BallHandle) {
            self.removed.push(ball);
        }

        fn field_width(&self) -> f32 {
            self.width
        }
    }
}
