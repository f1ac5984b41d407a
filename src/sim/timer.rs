//! Periodic timers on the simulation clock
//!
//! Each timer fires every `interval_ms` of simulated time. The fixed step is
//! not a multiple of every interval, so a step can fire a timer zero, one or
//! several times; the remainder carries over.

use crate::consts::{PLAYER_RENDER_INTERVAL_MS, REPOSITION_INTERVAL_MS, SCORE_INTERVAL_MS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicTimer {
    pub interval_ms: f64,
    elapsed_ms: f64,
}

impl PeriodicTimer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `dt_ms` and return how many times the timer fired
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if self.interval_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += dt_ms;
        let fired = (self.elapsed_ms / self.interval_ms).floor();
        self.elapsed_ms -= fired * self.interval_ms;
        fired as u32
    }
}

/// Firings collected during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerFirings {
    pub reposition: u32,
    pub player_render: u32,
    pub scoreboard: u32,
}

/// The three independent game timers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timers {
    /// New enemy targets
    pub reposition: PeriodicTimer,
    /// Player node refresh
    pub player_render: PeriodicTimer,
    /// Score increment
    pub scoreboard: PeriodicTimer,
}

impl Default for Timers {
    fn default() -> Self {
        Self {
            reposition: PeriodicTimer::new(REPOSITION_INTERVAL_MS),
            player_render: PeriodicTimer::new(PLAYER_RENDER_INTERVAL_MS),
            scoreboard: PeriodicTimer::new(SCORE_INTERVAL_MS),
        }
    }
}

impl Timers {
    pub fn advance(&mut self, dt_ms: f64) -> TimerFirings {
        TimerFirings {
            reposition: self.reposition.advance(dt_ms),
            player_render: self.player_render.advance(dt_ms),
            scoreboard: self.scoreboard.advance(dt_ms),
        }
    }
}
