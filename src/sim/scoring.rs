//! Score bookkeeping
//!
//! `score` climbs while the player survives and drops to zero on every counted
//! collision; `best_score` and `collisions` only ever grow.

use serde::{Deserialize, Serialize};

/// Cumulative counters shown on the scoreboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub score: u64,
    pub best_score: u64,
    pub collisions: u64,
}

impl GameStats {
    /// One more interval survived
    pub fn tick(&mut self) {
        self.score += 1;
    }

    /// Count a collision: bank the score if it is a new best, then reset it
    pub fn record_collision(&mut self) {
        self.collisions += 1;
        if self.score > self.best_score {
            self.best_score = self.score;
        }
        self.score = 0;
    }
}

/// Accepts at most one collision per window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionDebounce {
    pub window_ms: f64,
    last_accepted_ms: Option<f64>,
}

impl CollisionDebounce {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_accepted_ms: None,
        }
    }

    /// True (and remembers `now_ms`) when at least `window_ms` passed since the
    /// last accepted signal. The first signal is always accepted.
    pub fn accept(&mut self, now_ms: f64) -> bool {
        let open = self
            .last_accepted_ms
            .map(|last| now_ms - last >= self.window_ms)
            .unwrap_or(true);
        if open {
            self.last_accepted_ms = Some(now_ms);
        }
        open
    }

    pub fn last_accepted_ms(&self) -> Option<f64> {
        self.last_accepted_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tick_increments_score() {
        let mut stats = GameStats::default();
        stats.tick();
        stats.tick();
        assert_eq!(stats.score, 2);
        assert_eq!(stats.best_score, 0);
    }

    #[test]
    fn test_collision_keeps_higher_best() {
        let mut stats = GameStats {
            score: 3,
            best_score: 10,
            collisions: 4,
        };
        stats.record_collision();
        assert_eq!(stats.score, 0);
        assert_eq!(stats.best_score, 10);
        assert_eq!(stats.collisions, 5);
    }

    #[test]
    fn test_debounce_window() {
        let mut debounce = CollisionDebounce::new(1000.0);
        assert!(debounce.accept(100.0));
        assert!(!debounce.accept(600.0));
        assert!(!debounce.accept(1099.0));
        // Suppressed signals do not move the window
        assert!(debounce.accept(1100.0));
        assert_eq!(debounce.last_accepted_ms(), Some(1100.0));
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = GameStats {
            score: 1,
            best_score: 2,
            collisions: 3,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"score":1,"bestScore":2,"collisions":3}"#);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Tick,
        Collide(u16),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Tick),
            1 => (0u16..2000).prop_map(Op::Collide),
        ]
    }

    proptest! {
        #[test]
        fn best_score_never_decreases(ops in prop::collection::vec(op(), 0..200)) {
            let mut stats = GameStats::default();
            let mut debounce = CollisionDebounce::new(1000.0);
            let mut now = 0.0;
            let mut prev_best = 0;
            let mut prev_collisions = 0;

            for op in ops {
                match op {
                    Op::Tick => stats.tick(),
                    Op::Collide(gap) => {
                        now += gap as f64;
                        let before = stats;
                        if debounce.accept(now) {
                            stats.record_collision();
                            prop_assert_eq!(stats.score, 0);
                            prop_assert_eq!(stats.collisions, before.collisions + 1);
                            prop_assert!(stats.best_score >= before.score);
                        } else {
                            prop_assert_eq!(stats, before);
                        }
                    }
                }
                prop_assert!(stats.best_score >= prev_best);
                prop_assert!(stats.collisions >= prev_collisions);
                prev_best = stats.best_score;
                prev_collisions = stats.collisions;
            }
        }
    }
}
