//! Browser bridge
//!
//! The page owns rendering and Matter-style physics. It sends commands and
//! exit reports in, and drains JSON events and spawn orders out once per
//! animation frame.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::engine::payout::RowCount;
use crate::events::GameEvent;
use crate::game::{Command, Game};
use crate::physics::{BallHandle, BallSpawn, PhysicsBridge, PyramidLayout};
use crate::platform;

/// Ball the page still has to create
#[derive(Debug, Clone, Serialize)]
struct SpawnOrder {
    ball: BallHandle,
    #[serde(flatten)]
    spawn: BallSpawn,
}

/// Physics bridge backed by queues the page drains
#[derive(Debug, Default)]
pub struct JsPhysics {
    width: f32,
    spawns: Vec<SpawnOrder>,
    removals: Vec<BallHandle>,
}

impl PhysicsBridge for JsPhysics {
    fn configure_pyramid(&mut self, rows: RowCount) {
        // The page rebuilds its pins on the RowsChanged event
        log::debug!("Pyramid configured for {} rows", rows);
    }

    fn spawn_ball(&mut self, ball: BallHandle, spawn: BallSpawn) {
        self.spawns.push(SpawnOrder { ball, spawn });
    }

    fn remove_ball(&mut self, ball: BallHandle) {
        self.spawns.retain(|order| order.ball != ball);
        self.removals.push(ball);
    }

    fn field_width(&self) -> f32 {
        self.width
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Plinko engine loaded");
}

#[wasm_bindgen]
pub struct WebPlinko {
    game: Game<JsPhysics, Vec<GameEvent>>,
}

#[wasm_bindgen]
impl WebPlinko {
    /// Create a table for a field of `width` pixels, with optional JSON tuning
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, config_json: Option<String>) -> Result<WebPlinko, JsError> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json)?,
            None => GameConfig::default(),
        };
        let physics = JsPhysics {
            width,
            ..Default::default()
        };
        let seed = platform::now_ms();
        let mut game = Game::new(&config, physics, Vec::new(), seed)?;
        game.announce();
        log::info!("Table ready ({}px wide, seed {})", width, seed);
        Ok(WebPlinko { game })
    }

    /// Apply a JSON command such as `{"type": "launch"}`
    pub fn command(&mut self, json: &str) -> Result<(), JsError> {
        let command: Command = serde_json::from_str(json)?;
        self.game.handle(command, platform::now_ms())?;
        Ok(())
    }

    /// Call once per animation frame
    pub fn update(&mut self) -> Result<(), JsError> {
        self.game.update(platform::now_ms())?;
        Ok(())
    }

    /// A ball crossed the bottom boundary at `exit_x`
    pub fn ball_exited(&mut self, ball: u64, exit_x: f32) -> Result<(), JsError> {
        self.game.ball_exited(BallHandle::new(ball), exit_x)?;
        Ok(())
    }

    /// Layout/resize: later exits resolve against this width
    pub fn resize(&mut self, width: f32) {
        self.game.physics_mut().width = width;
    }

    /// Pin layout for the current row count as JSON
    pub fn layout(&self, height: f32) -> Result<String, JsError> {
        let wager = self.game.engine().wager();
        let width = self.game.engine().physics().field_width();
        let layout = PyramidLayout::new(wager.rows(), width, height);
        Ok(serde_json::to_string(&layout)?)
    }

    /// Drain pending events as a JSON array
    pub fn take_events(&mut self) -> Result<String, JsError> {
        let events = std::mem::take(self.game.events_mut());
        Ok(serde_json::to_string(&events)?)
    }

    /// Drain pending spawn orders as a JSON array
    pub fn take_spawns(&mut self) -> Result<String, JsError> {
        let spawns = std::mem::take(&mut self.game.physics_mut().spawns);
        Ok(serde_json::to_string(&spawns)?)
    }

    /// Drain handles of balls the page should delete
    pub fn take_removals(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.game.physics_mut().removals)
            .into_iter()
            .map(BallHandle::id)
            .collect()
    }
}
