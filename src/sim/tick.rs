//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::collision::any_enemy_overlaps;
use super::spawn::random_position;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::settings::GameOptions;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position while the player is being dragged (field coordinates)
    pub drag: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
    /// Tear the game down
    pub stop: bool,
}

/// Clamp a drag position into the reachable part of the field
pub fn clamp_drag(pos: Vec2, options: &GameOptions) -> Vec2 {
    let max_x = options.width as f32 * DRAG_MAX_X_FRACTION;
    let max_y = options.height as f32 * DRAG_MAX_Y_FRACTION;
    Vec2::new(pos.x.clamp(0.0, max_x), pos.y.clamp(0.0, max_y))
}

/// Send every enemy toward a fresh random target
pub fn reposition_enemies(state: &mut GameState) {
    let (width, height) = (state.options.width, state.options.height);
    for enemy in &mut state.enemies {
        let target = random_position(&mut state.rng, width, height);
        enemy.move_to(target, TRANSITION_MS);
    }
    log::debug!(
        "Repositioned {} enemies at {:.0}ms",
        state.enemies.len(),
        state.clock_ms
    );
    state.emit(GameEvent::EnemiesRepositioned);
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    if input.stop {
        state.stop();
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                log::info!("Paused at {:.0}ms", state.clock_ms);
                state.emit(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Running;
                log::info!("Resumed at {:.0}ms", state.clock_ms);
                state.emit(GameEvent::Resumed);
            }
            GamePhase::Stopped => {}
        }
    }

    if !state.is_running() {
        return;
    }

    // Drag writes straight into the player record
    if let Some(pointer) = input.drag {
        let pos = clamp_drag(pointer, &state.options);
        if pos != state.player.pos {
            state.player.pos = pos;
            state.emit(GameEvent::PlayerMoved { pos });
        }
    }

    state.time_ticks += 1;
    state.clock_ms += dt_ms;
    let fired = state.timers.advance(dt_ms);

    for _ in 0..fired.reposition {
        reposition_enemies(state);
    }

    for enemy in &mut state.enemies {
        enemy.advance_transition(dt_ms);
    }

    // Moving and resting enemies alike
    if any_enemy_overlaps(&state.enemies, &state.player) {
        let now = state.clock_ms;
        state.on_collision(now);
    }

    if fired.scoreboard > 0 {
        for _ in 0..fired.scoreboard {
            state.stats.tick();
        }
        let score = state.stats.score;
        state.emit(GameEvent::ScoreTicked { score });
    }

    if fired.player_render > 0 {
        state.emit(GameEvent::PlayerRenderDue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_state(seed: u64) -> GameState {
        let mut state = GameState::new(GameOptions::default(), seed).unwrap();
        // Park the player where nothing spawns
        state.player.pos = Vec2::new(5.0, 5.0);
        state
    }

    fn run_ms(state: &mut GameState, input: &TickInput, ms: f64) {
        let steps = (ms / SIM_DT_MS).round() as u32;
        for _ in 0..steps {
            tick(state, input, SIM_DT_MS);
        }
    }

    #[test]
    fn test_score_climbs_while_untouched() {
        let mut state = quiet_state(1);
        run_ms(&mut state, &TickInput::default(), 1000.0);
        assert!((32..=34).contains(&state.stats.score), "{}", state.stats.score);
        assert_eq!(state.stats.collisions, 0);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::ScoreTicked { .. }))
        );
    }

    #[test]
    fn test_enemies_start_moving_after_interval() {
        let mut state = quiet_state(2);
        run_ms(&mut state, &TickInput::default(), 2900.0);
        assert!(state.enemies.iter().all(|e| !e.is_moving()));

        run_ms(&mut state, &TickInput::default(), 200.0);
        assert!(state.enemies.iter().all(|e| e.is_moving()));
        assert!(state.events().contains(&GameEvent::EnemiesRepositioned));
    }

    #[test]
    fn test_enemy_positions_stay_in_spawn_bounds() {
        let mut state = quiet_state(3);
        let m = SPAWN_MARGIN as f32;
        for _ in 0..(10_000.0 / SIM_DT_MS) as u32 {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
            for e in &state.enemies {
                assert!(e.pos.x >= m && e.pos.x <= 700.0 - m);
                assert!(e.pos.y >= m && e.pos.y <= 450.0 - m);
            }
        }
    }

    #[test]
    fn test_stationary_overlap_is_detected() {
        let mut state = quiet_state(4);
        for _ in 0..3 {
            state.stats.tick();
        }
        state.player.pos = state.enemies[0].pos + Vec2::new(3.0, 0.0);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.stats.collisions, 1);
        assert_eq!(state.stats.best_score, 3);
        assert!(state.events().iter().any(|e| matches!(
            e,
            GameEvent::CollisionOccurred { collisions: 1, best_score: 3 }
        )));
    }

    #[test]
    fn test_continuous_overlap_counts_once_per_window() {
        let mut state = quiet_state(5);
        let spot = state.enemies[0].pos;
        state.player.pos = spot;
        // Enemies stay put for the first three seconds
        run_ms(&mut state, &TickInput::default(), 2500.0);
        assert_eq!(state.stats.collisions, 3);
    }

    #[test]
    fn test_drag_is_clamped() {
        let mut state = quiet_state(6);
        let input = TickInput {
            drag: Some(Vec2::new(10_000.0, -40.0)),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT_MS);
        assert_eq!(state.player.pos, Vec2::new(700.0 * 0.93, 0.0));
        assert!(state.events().iter().any(|e| matches!(e, GameEvent::PlayerMoved { .. })));
    }

    #[test]
    fn test_clamp_drag_inside_is_identity() {
        let options = GameOptions::default();
        let pos = Vec2::new(120.0, 80.0);
        assert_eq!(clamp_drag(pos, &options), pos);
        assert_eq!(
            clamp_drag(Vec2::new(-5.0, 1000.0), &options),
            Vec2::new(0.0, 450.0 * 0.75)
        );
    }

    #[test]
    fn test_pause_freezes_clock_and_resume_continues() {
        let mut state = quiet_state(7);
        run_ms(&mut state, &TickInput::default(), 500.0);
        let score = state.stats.score;
        let clock = state.clock_ms;

        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &toggle, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Paused);
        run_ms(&mut state, &TickInput::default(), 500.0);
        assert_eq!(state.stats.score, score);
        assert_eq!(state.clock_ms, clock);

        tick(&mut state, &toggle, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.clock_ms > clock);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Paused));
        assert!(events.contains(&GameEvent::Resumed));
    }

    #[test]
    fn test_stop_is_final() {
        let mut state = quiet_state(8);
        let stop = TickInput {
            stop: true,
            ..Default::default()
        };
        tick(&mut state, &stop, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Stopped);

        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };
        run_ms(&mut state, &toggle, 1000.0);
        assert_eq!(state.phase, GamePhase::Stopped);
        assert_eq!(state.clock_ms, 0.0);
        assert_eq!(state.stats.score, 0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(GameOptions::default(), 99999).unwrap();
        let mut state2 = GameState::new(GameOptions::default(), 99999).unwrap();

        let inputs = [
            TickInput {
                drag: Some(Vec2::new(200.0, 150.0)),
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                drag: Some(Vec2::new(320.0, 90.0)),
                ..Default::default()
            },
        ];

        for _ in 0..400 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT_MS);
                tick(&mut state2, input, SIM_DT_MS);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.stats, state2.stats);
        assert_eq!(state1.enemies, state2.enemies);
        assert_eq!(state1.drain_events(), state2.drain_events());
    }
}
