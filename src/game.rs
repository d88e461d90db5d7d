//! Command surface for the presentation layer
//!
//! `Game` owns the round engine, the autoplay controller and the event
//! sink. UI input arrives as [`Command`]s, physics exits via
//! [`Game::ball_exited`], and time only moves through `now_ms` arguments.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::engine::autoplay::{AutoplayController, TickOutcome};
use crate::engine::payout::RowCount;
use crate::engine::round::{RoundEngine, RoundResult};
use crate::engine::wallet::{BetBound, BetDirection};
use crate::error::PlinkoError;
use crate::events::{EventSink, GameEvent, StopReason};
use crate::physics::{BallHandle, PhysicsBridge};

/// What the launch button does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    #[default]
    Manual,
    Auto,
}

/// Inbound UI command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Drop one ball now
    Launch,
    /// The launch button: drop a ball (manual) or toggle autoplay (auto)
    PressLaunch { auto_count: u32 },
    AdjustBet { direction: BetDirection },
    SetBetBound { bound: BetBound },
    SetRowCount { rows: u8 },
    /// `count == 0` runs until stopped or broke
    StartAutoplay { count: u32 },
    StopAutoplay,
    ResetBalance,
    SetMode { mode: PlayMode },
}

/// A complete Plinko table
#[derive(Debug)]
pub struct Game<P: PhysicsBridge, E: EventSink> {
    engine: RoundEngine<P>,
    autoplay: AutoplayController,
    events: E,
    mode: PlayMode,
}

impl<P: PhysicsBridge, E: EventSink> Game<P, E> {
    pub fn new(config: &GameConfig, physics: P, events: E, seed: u64) -> Result<Self, PlinkoError> {
        Ok(Self {
            engine: RoundEngine::new(config, physics, seed)?,
            autoplay: AutoplayController::new(config.autoplay_interval_ms),
            events,
            mode: PlayMode::Manual,
        })
    }

    pub fn engine(&self) -> &RoundEngine<P> {
        &self.engine
    }

    pub fn autoplay(&self) -> &AutoplayController {
        &self.autoplay
    }

    pub fn physics_mut(&mut self) -> &mut P {
        self.engine.physics_mut()
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Emit the full display state (balance, bet, board)
    pub fn announce(&mut self) {
        let wager = self.engine.wager();
        let (balance, bet, rows) = (wager.balance(), wager.current_bet(), wager.rows());
        self.events.emit(GameEvent::BalanceChanged { balance });
        self.events.emit(GameEvent::BetChanged { bet });
        self.emit_rows(rows);
    }

    pub fn handle(&mut self, command: Command, now_ms: u64) -> Result<(), PlinkoError> {
        match command {
            Command::Launch => self.launch(now_ms).map(|_| ()),
            Command::PressLaunch { auto_count } => self.press_launch(auto_count, now_ms),
            Command::AdjustBet { direction } => self.adjust_bet(direction),
            Command::SetBetBound { bound } => self.set_bet_bound(bound),
            Command::SetRowCount { rows } => self.set_rows(rows).map(|_| ()),
            Command::StartAutoplay { count } => {
                self.start_autoplay(count, now_ms);
                Ok(())
            }
            Command::StopAutoplay => {
                self.stop_autoplay();
                Ok(())
            }
            Command::ResetBalance => {
                self.engine.reset_balance(&mut self.events);
                Ok(())
            }
            Command::SetMode { mode } => self.set_mode(mode),
        }
    }

    /// Manual launch; running out of money also ends autoplay
    pub fn launch(&mut self, now_ms: u64) -> Result<BallHandle, PlinkoError> {
        let result = self.engine.request_launch(now_ms, &mut self.events);
        if let Err(err) = &result {
            if err.stops_autoplay() {
                self.autoplay
                    .stop(StopReason::InsufficientFunds, &mut self.events);
            }
        }
        result
    }

    pub fn press_launch(&mut self, auto_count: u32, now_ms: u64) -> Result<(), PlinkoError> {
        match self.mode {
            PlayMode::Manual => self.launch(now_ms).map(|_| ()),
            PlayMode::Auto if self.autoplay.is_running() => {
                self.stop_autoplay();
                Ok(())
            }
            PlayMode::Auto => {
                self.start_autoplay(auto_count, now_ms);
                Ok(())
            }
        }
    }

    pub fn adjust_bet(&mut self, direction: BetDirection) -> Result<(), PlinkoError> {
        self.ensure_unlocked()?;
        if self.engine.wager_mut().adjust_bet(direction) {
            self.emit_bet();
        }
        Ok(())
    }

    pub fn set_bet_bound(&mut self, bound: BetBound) -> Result<(), PlinkoError> {
        self.ensure_unlocked()?;
        self.engine.wager_mut().set_bet_to_bound(bound);
        self.emit_bet();
        Ok(())
    }

    pub fn set_rows(&mut self, rows: u8) -> Result<RowCount, PlinkoError> {
        self.ensure_unlocked()?;
        let rows = self.engine.set_rows(rows)?;
        self.emit_rows(rows);
        Ok(rows)
    }

    pub fn start_autoplay(&mut self, count: u32, now_ms: u64) {
        self.autoplay.start(count, now_ms, &mut self.events);
    }

    pub fn stop_autoplay(&mut self) {
        self.autoplay.stop(StopReason::Requested, &mut self.events);
    }

    pub fn set_mode(&mut self, mode: PlayMode) -> Result<(), PlinkoError> {
        if mode == self.mode {
            return Ok(());
        }
        self.ensure_unlocked()?;
        log::info!("Play mode: {:?}", mode);
        self.mode = mode;
        Ok(())
    }

    /// Physics reports a ball leaving the field
    pub fn ball_exited(&mut self, ball: BallHandle, exit_x: f32) -> Result<RoundResult, PlinkoError> {
        self.engine.ball_exited(ball, exit_x, &mut self.events)
    }

    /// Advance timers: run a due autoplay tick and expire stuck balls
    pub fn update(&mut self, now_ms: u64) -> Result<TickOutcome, PlinkoError> {
        let outcome = self
            .autoplay
            .poll(now_ms, &mut self.engine, &mut self.events);
        self.engine.expire_stuck(now_ms, &mut self.events)?;
        Ok(outcome)
    }

    fn ensure_unlocked(&self) -> Result<(), PlinkoError> {
        if self.autoplay.is_running() {
            return Err(PlinkoError::ControlsLocked);
        }
        Ok(())
    }

    fn emit_bet(&mut self) {
        let bet = self.engine.wager().current_bet();
        self.events.emit(GameEvent::BetChanged { bet });
    }

    fn emit_rows(&mut self, rows: RowCount) {
        self.events.emit(GameEvent::RowsChanged {
            rows,
            slot_count: rows.slot_count(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::autoplay::AutoplayBudget;
    use crate::engine::resolver::resolve;
    use crate::events::RejectReason;
    use crate::money::Credits;
    use crate::physics::SimulatedDrop;

    type TestGame = Game<SimulatedDrop, Vec<GameEvent>>;

    fn game_with(config: GameConfig) -> TestGame {
        Game::new(&config, SimulatedDrop::new(3, 800.0, 2_000), Vec::new(), 3).expect("valid")
    }

    fn game() -> TestGame {
        game_with(GameConfig::default())
    }

    #[test]
    fn test_announce() {
        let mut game = game();
        game.announce();
        assert_eq!(
            game.events().as_slice(),
            &[
                GameEvent::BalanceChanged {
                    balance: Credits::from_units(1000)
                },
                GameEvent::BetChanged {
                    bet: Credits::from_units(10)
                },
                GameEvent::RowsChanged {
                    rows: RowCount::new(16).unwrap(),
                    slot_count: 17
                },
            ]
        );
    }

    #[test]
    fn test_commands_from_json() {
        let mut game = game();
        let commands = [
            r#"{"type": "adjust_bet", "direction": "up"}"#,
            r#"{"type": "set_row_count", "rows": 12}"#,
            r#"{"type": "launch"}"#,
        ];
        for json in commands {
            let command: Command = serde_json::from_str(json).expect("valid command");
            game.handle(command, 0).expect("accepted");
        }
        let wager = game.engine().wager();
        assert_eq!(wager.current_bet(), Credits::from_units(15));
        assert_eq!(wager.rows().get(), 12);
        assert_eq!(wager.balance(), Credits::from_units(985));
    }

    #[test]
    fn test_bet_at_max_is_silent_noop() {
        let mut game = game();
        game.set_bet_bound(BetBound::Max).unwrap();
        game.events_mut().clear();

        game.adjust_bet(BetDirection::Up).unwrap();
        assert_eq!(game.engine().wager().current_bet(), Credits::from_units(1000));
        assert!(game.events().is_empty());
    }

    #[test]
    fn test_manual_funds_rejection_stops_autoplay() {
        let config = GameConfig {
            initial_balance: Credits::from_units(5),
            ..Default::default()
        };
        let mut game = game_with(config);
        game.start_autoplay(10, 0);

        let err = game.launch(10).unwrap_err();
        assert!(matches!(err, PlinkoError::InsufficientFunds { .. }));
        assert!(!game.autoplay().is_running());
        assert!(game.events().contains(&GameEvent::LaunchRejected {
            reason: RejectReason::InsufficientFunds
        }));
    }

    #[test]
    fn test_controls_locked_during_autoplay() {
        let mut game = game();
        game.set_mode(PlayMode::Auto).unwrap();
        game.press_launch(5, 0).unwrap();
        assert!(game.autoplay().is_running());

        assert!(matches!(game.adjust_bet(BetDirection::Up), Err(PlinkoError::ControlsLocked)));
        assert!(matches!(game.set_rows(10), Err(PlinkoError::ControlsLocked)));
        assert!(matches!(
            game.set_mode(PlayMode::Manual),
            Err(PlinkoError::ControlsLocked)
        ));
        // Re-selecting the current mode is allowed
        assert!(game.set_mode(PlayMode::Auto).is_ok());
        assert_eq!(game.engine().wager().current_bet(), Credits::from_units(10));

        // Pressing again stops and unlocks
        game.press_launch(5, 100).unwrap();
        assert!(!game.autoplay().is_running());
        assert!(game.set_rows(10).is_ok());
        assert!(game.set_mode(PlayMode::Manual).is_ok());
    }

    #[test]
    fn test_simulated_drop_resize() {
        let mut game = game();
        let ball = game.launch(0).unwrap();
        let mut unresized = game.physics_mut().clone();
        game.physics_mut().resize(400.0);

        let (_, wide_x) = unresized.advance(2_000)[0];
        let landed = game.physics_mut().advance(2_000);
        assert_eq!(landed.len(), 1);
        let (landed_ball, exit_x) = landed[0];
        assert_eq!(landed_ball, ball);
        assert!((exit_x - wide_x / 2.0).abs() < 0.001);

        // Resolved against the width at exit time
        let result = game.ball_exited(ball, exit_x).unwrap();
        assert_eq!(result.slot, resolve(exit_x, 400.0, 17));
        assert_eq!(result.slot, resolve(wide_x, 800.0, 17));
    }

    #[test]
    fn test_full_session_balances() {
        let config = GameConfig {
            launch_cooldown_ms: 0,
            ..Default::default()
        };
        let mut game = game_with(config);
        game.start_autoplay(20, 0);

        let mut now = 0;
        while game.autoplay().is_running() || game.engine().in_flight_count() > 0 {
            now += 50;
            for (ball, x) in game.physics_mut().advance(now) {
                game.ball_exited(ball, x).unwrap();
            }
            game.update(now).unwrap();
            assert!(now < 60_000, "session did not finish");
        }

        let (mut debited, mut credited) = (0, 0);
        for event in game.events() {
            if let GameEvent::RoundResult(result) = event {
                debited += result.wager.cents();
                credited += result.payout.cents();
            }
        }
        assert_eq!(debited, Credits::from_units(200).cents());
        assert_eq!(
            game.engine().wager().balance().cents(),
            Credits::from_units(1000).cents() + credited - debited
        );
        assert_eq!(game.autoplay().budget(), AutoplayBudget::Remaining(0));
    }

    #[test]
    fn test_update_expires_stuck_balls() {
        let config = GameConfig {
            stuck_ball_timeout_ms: 1_000,
            ..Default::default()
        };
        let mut game = game_with(config);
        let ball = game.launch(0).unwrap();
        // Physics lost track of it
        game.physics_mut().remove_ball(ball);

        game.update(1_000).unwrap();
        assert_eq!(game.engine().in_flight_count(), 0);
        assert_eq!(game.engine().wager().balance(), Credits::from_units(1000));
        assert!(game.events().contains(&GameEvent::BallExpired {
            ball,
            refund: Credits::from_units(10)
        }));
    }

    #[test]
    fn test_reset_balance_command() {
        let mut game = game();
        game.launch(0).unwrap();
        game.handle(Command::ResetBalance, 10).unwrap();
        assert_eq!(game.engine().wager().balance(), Credits::from_units(1000));
    }
}
