//! Timer-driven automatic launches
//!
//! A session owns exactly one schedule, identified by a [`TimerToken`].
//! Stopping (or restarting) retires the token, so a tick that was already
//! queued by the host can never launch after `stop` returns.
//!
//! Two ways to drive it:
//! - `poll(now)` from a frame loop: fires the tick once its deadline passes
//!   (late polls coalesce missed ticks into one, like a browser interval)
//! - `fire_tick(token, now)` from a host timer that captured the token at
//!   `start`

use serde::{Deserialize, Serialize};

use super::round::RoundEngine;
use crate::events::{EventSink, GameEvent, StopReason};
use crate::physics::{BallHandle, PhysicsBridge};

/// Launches left in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoplayBudget {
    Unbounded,
    Remaining(u32),
}

impl AutoplayBudget {
    /// `0` requests an unbounded session
    pub fn from_count(count: u32) -> Self {
        if count == 0 {
            AutoplayBudget::Unbounded
        } else {
            AutoplayBudget::Remaining(count)
        }
    }

    pub fn is_depleted(&self) -> bool {
        matches!(self, AutoplayBudget::Remaining(0))
    }

    fn consume(&mut self) {
        if let AutoplayBudget::Remaining(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

/// Identity of one scheduled session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing due, or the token is stale
    Idle,
    Launched(BallHandle),
    /// Launch hit the cooldown; not counted against the budget
    Skipped,
    Stopped(StopReason),
}

#[derive(Debug, Clone)]
struct AutoplaySession {
    token: TimerToken,
    budget: AutoplayBudget,
    next_due_ms: u64,
}

/// Autoplay state machine (Stopped <-> Running)
#[derive(Debug, Clone)]
pub struct AutoplayController {
    interval_ms: u64,
    session: Option<AutoplaySession>,
    next_token: u64,
    /// Budget of the current session, or where the last one ended
    last_budget: AutoplayBudget,
}

impl AutoplayController {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            session: None,
            next_token: 1,
            last_budget: AutoplayBudget::Remaining(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn budget(&self) -> AutoplayBudget {
        self.session
            .as_ref()
            .map(|s| s.budget)
            .unwrap_or(self.last_budget)
    }

    /// Token of the live schedule, if any
    pub fn token(&self) -> Option<TimerToken> {
        self.session.as_ref().map(|s| s.token)
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.next_due_ms)
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Begin a session of `count` launches (`0` = unbounded)
    ///
    /// A running session is cancelled first, so there is never more than
    /// one live schedule.
    pub fn start<E: EventSink + ?Sized>(
        &mut self,
        count: u32,
        now_ms: u64,
        events: &mut E,
    ) -> TimerToken {
        self.stop(StopReason::Restarted, events);

        let token = TimerToken(self.next_token);
        self.next_token += 1;
        let budget = AutoplayBudget::from_count(count);
        self.session = Some(AutoplaySession {
            token,
            budget,
            next_due_ms: now_ms.saturating_add(self.interval_ms),
        });
        self.last_budget = budget;

        log::info!("Autoplay started ({:?}, every {}ms)", budget, self.interval_ms);
        events.emit(GameEvent::AutoplayStateChanged {
            running: true,
            budget,
            stop_reason: None,
        });
        token
    }

    /// Cancel the session; returns false if nothing was running
    pub fn stop<E: EventSink + ?Sized>(&mut self, reason: StopReason, events: &mut E) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        self.last_budget = session.budget;

        log::info!("Autoplay stopped ({:?}, {:?} left)", reason, session.budget);
        events.emit(GameEvent::AutoplayStateChanged {
            running: false,
            budget: session.budget,
            stop_reason: Some(reason),
        });
        true
    }

    /// Fire the tick if its deadline has passed
    pub fn poll<P: PhysicsBridge, E: EventSink + ?Sized>(
        &mut self,
        now_ms: u64,
        engine: &mut RoundEngine<P>,
        events: &mut E,
    ) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };
        if now_ms < session.next_due_ms {
            return TickOutcome::Idle;
        }

        session.next_due_ms = session.next_due_ms.saturating_add(self.interval_ms);
        if session.next_due_ms <= now_ms {
            session.next_due_ms = now_ms.saturating_add(self.interval_ms);
        }
        let token = session.token;
        self.fire_tick(token, now_ms, engine, events)
    }

    /// Run one tick for `token`; stale tokens do nothing
    pub fn fire_tick<P: PhysicsBridge, E: EventSink + ?Sized>(
        &mut self,
        token: TimerToken,
        now_ms: u64,
        engine: &mut RoundEngine<P>,
        events: &mut E,
    ) -> TickOutcome {
        let budget = match &self.session {
            Some(session) if session.token == token => session.budget,
            _ => return TickOutcome::Idle,
        };

        if budget.is_depleted() {
            self.stop(StopReason::Depleted, events);
            return TickOutcome::Stopped(StopReason::Depleted);
        }

        match engine.request_launch(now_ms, events) {
            Ok(ball) => {
                let mut budget = budget;
                budget.consume();
                if let Some(session) = self.session.as_mut() {
                    session.budget = budget;
                }
                self.last_budget = budget;

                if budget.is_depleted() {
                    self.stop(StopReason::Depleted, events);
                } else {
                    events.emit(GameEvent::AutoplayStateChanged {
                        running: true,
                        budget,
                        stop_reason: None,
                    });
                }
                TickOutcome::Launched(ball)
            }
            Err(err) if err.stops_autoplay() => {
                self.stop(StopReason::InsufficientFunds, events);
                TickOutcome::Stopped(StopReason::InsufficientFunds)
            }
            Err(_) => TickOutcome::Skipped,
        }
    }
}
