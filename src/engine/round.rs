//! Launch and resolution of individual rounds
//!
//! A round moves Idle -> Debiting -> InFlight -> Resolved. The debit happens
//! (and is announced) before the physics side is asked for a ball, and each
//! in-flight ball is paid out at most once, in whatever order exits arrive.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::payout::RowCount;
use super::resolver::resolve;
use super::wallet::WagerState;
use crate::config::GameConfig;
use crate::consts::{LAUNCH_NUDGE_SPREAD, LAUNCH_VELOCITY_SPREAD};
use crate::error::PlinkoError;
use crate::events::{EventSink, GameEvent};
use crate::money::{Credits, Multiplier};
use crate::physics::{BallHandle, BallSpawn, PhysicsBridge};

/// A ball the engine has paid for and not yet resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InFlightBall {
    pub handle: BallHandle,
    /// Bet debited for this ball
    pub wager: Credits,
    /// Pyramid the ball was dropped into (selects its payout table)
    pub rows: RowCount,
    pub launched_at_ms: u64,
}

/// Outcome of a resolved ball
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub ball: BallHandle,
    pub slot: usize,
    pub multiplier: Multiplier,
    pub wager: Credits,
    pub payout: Credits,
}

impl RoundResult {
    /// Paid back at least the wager (presentation label only)
    pub fn is_win(&self) -> bool {
        self.multiplier >= Multiplier::ONE
    }
}

/// Per-ball launch/resolve state machine over a wallet and a physics bridge
#[derive(Debug)]
pub struct RoundEngine<P: PhysicsBridge> {
    wager: WagerState,
    physics: P,
    launch_cooldown_ms: u64,
    stuck_ball_timeout_ms: u64,
    last_launch_ms: Option<u64>,
    in_flight: BTreeMap<BallHandle, InFlightBall>,
    next_ball_id: u64,
    rng: Pcg32,
}

impl<P: PhysicsBridge> RoundEngine<P> {
    /// Build an engine and lay out the initial pyramid
    pub fn new(config: &GameConfig, mut physics: P, seed: u64) -> Result<Self, PlinkoError> {
        let wager = WagerState::new(config)?;
        physics.configure_pyramid(wager.rows());

        Ok(Self {
            wager,
            physics,
            launch_cooldown_ms: config.launch_cooldown_ms,
            stuck_ball_timeout_ms: config.stuck_ball_timeout_ms,
            last_launch_ms: None,
            in_flight: BTreeMap::new(),
            next_ball_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    pub fn wager(&self) -> &WagerState {
        &self.wager
    }

    pub fn wager_mut(&mut self) -> &mut WagerState {
        &mut self.wager
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    /// Balls launched and not yet resolved, by handle
    pub fn in_flight(&self) -> impl Iterator<Item = &InFlightBall> {
        self.in_flight.values()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Switch the pyramid size and rebuild the board
    ///
    /// Balls already falling keep the table they were launched with.
    pub fn set_rows(&mut self, rows: u8) -> Result<RowCount, PlinkoError> {
        let rows = self.wager.set_rows(rows)?;
        self.physics.configure_pyramid(rows);
        log::info!("Pyramid set to {} rows ({} slots)", rows, rows.slot_count());
        Ok(rows)
    }

    /// Check whether a launch at `now_ms` would be accepted
    pub fn check_launch(&self, now_ms: u64) -> Result<(), PlinkoError> {
        if let Some(last) = self.last_launch_ms {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < self.launch_cooldown_ms {
                return Err(PlinkoError::Cooldown {
                    remaining_ms: self.launch_cooldown_ms - elapsed,
                });
            }
        }

        let bet = self.wager.current_bet();
        if !self.wager.can_afford(bet) {
            return Err(PlinkoError::InsufficientFunds {
                balance: self.wager.balance(),
                bet,
            });
        }
        Ok(())
    }

    /// Debit the current bet and drop a ball
    ///
    /// A rejected launch (cooldown or funds) changes nothing and is reported
    /// as `LaunchRejected`. An `InsufficientFunds` error means any autoplay
    /// session must stop.
    pub fn request_launch<E: EventSink + ?Sized>(
        &mut self,
        now_ms: u64,
        events: &mut E,
    ) -> Result<BallHandle, PlinkoError> {
        if let Err(err) = self.check_launch(now_ms) {
            log::debug!("Launch rejected: {}", err);
            if let Some(reason) = err.reject_reason() {
                events.emit(GameEvent::LaunchRejected { reason });
            }
            return Err(err);
        }

        let bet = self.wager.current_bet();
        let balance = self.wager.debit(bet)?;
        events.emit(GameEvent::BalanceChanged { balance });
        self.last_launch_ms = Some(now_ms);

        let handle = BallHandle::new(self.next_ball_id);
        self.next_ball_id += 1;
        let rows = self.wager.rows();
        self.in_flight.insert(
            handle,
            InFlightBall {
                handle,
                wager: bet,
                rows,
                launched_at_ms: now_ms,
            },
        );

        let nudge = (self.rng.random::<f32>() - 0.5) * LAUNCH_NUDGE_SPREAD;
        let velocity_x = (self.rng.random::<f32>() - 0.5) * LAUNCH_VELOCITY_SPREAD;
        let spawn = BallSpawn::centered(self.physics.field_width(), rows, nudge, velocity_x);
        self.physics.spawn_ball(handle, spawn);

        log::debug!("Launched ball {} (bet {}, balance {})", handle, bet, balance);
        Ok(handle)
    }

    /// Resolve a ball that left the bottom of the field at `exit_x`
    ///
    /// Pays the wager fixed at launch, not the bet current at exit. Uses the
    /// field width current at exit time. Reporting the same ball twice (or
    /// an unknown one) is an `UnknownBall` error and pays nothing.
    pub fn ball_exited<E: EventSink + ?Sized>(
        &mut self,
        handle: BallHandle,
        exit_x: f32,
        events: &mut E,
    ) -> Result<RoundResult, PlinkoError> {
        let Some(ball) = self.in_flight.get(&handle).copied() else {
            log::warn!("Exit reported for unknown ball {}", handle);
            return Err(PlinkoError::UnknownBall(handle));
        };

        let table = ball.rows.multipliers();
        let slot = resolve(exit_x, self.physics.field_width(), table.len());
        let multiplier = table[slot];
        let payout = ball
            .wager
            .apply(multiplier)
            .ok_or(PlinkoError::BalanceOverflow)?;

        let balance = self.wager.credit(payout)?;
        self.in_flight.remove(&handle);

        let result = RoundResult {
            ball: handle,
            slot,
            multiplier,
            wager: ball.wager,
            payout,
        };
        log::debug!(
            "Ball {} landed in slot {} ({}): paid {}",
            handle,
            slot,
            multiplier,
            payout
        );
        events.emit(GameEvent::BalanceChanged { balance });
        events.emit(GameEvent::RoundResult(result.clone()));
        Ok(result)
    }

    /// Refund and drop every ball in flight longer than the stuck timeout
    pub fn expire_stuck<E: EventSink + ?Sized>(
        &mut self,
        now_ms: u64,
        events: &mut E,
    ) -> Result<Vec<BallHandle>, PlinkoError> {
        let stuck: Vec<InFlightBall> = self
            .in_flight
            .values()
            .filter(|b| now_ms.saturating_sub(b.launched_at_ms) >= self.stuck_ball_timeout_ms)
            .copied()
            .collect();

        let mut expired = Vec::with_capacity(stuck.len());
        for ball in stuck {
            let balance = self.wager.credit(ball.wager)?;
            self.in_flight.remove(&ball.handle);
            self.physics.remove_ball(ball.handle);

            log::warn!(
                "Ball {} stuck for {}ms, refunded {}",
                ball.handle,
                now_ms.saturating_sub(ball.launched_at_ms),
                ball.wager
            );
            events.emit(GameEvent::BallExpired {
                ball: ball.handle,
                refund: ball.wager,
            });
            events.emit(GameEvent::BalanceChanged { balance });
            expired.push(ball.handle);
        }
        Ok(expired)
    }

    /// Restore the starting balance
    pub fn reset_balance<E: EventSink + ?Sized>(&mut self, events: &mut E) -> Credits {
        self.wager.reset_balance();
        let balance = self.wager.balance();
        log::info!("Balance reset to {}", balance);
        events.emit(GameEvent::BalanceChanged { balance });
        balance
    }
}
