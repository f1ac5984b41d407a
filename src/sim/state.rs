//! Game state and core simulation types
//!
//! One `GameState` owns every enemy, the player, the counters and the timers.
//! Nothing here is global; the shell holds the state and passes it around.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::scoring::{CollisionDebounce, GameStats};
use super::spawn::{create_enemies, create_player};
use super::timer::Timers;
use crate::consts::COLLISION_DEBOUNCE_MS;
use crate::error::ConfigError;
use crate::settings::GameOptions;

/// Plain RGB color (0-1 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Pack with an alpha channel for the GPU
    pub fn with_alpha(self, a: f32) -> [f32; 4] {
        [self.r, self.g, self.b, a]
    }
}

/// What an entity is; enemies and the player share one record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Enemy,
    Player,
}

/// Visual style attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    /// Opacity of the fill only; the stroke is always opaque
    pub fill_opacity: f32,
}

impl Style {
    /// Black on black
    pub fn enemy() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            stroke_width: crate::consts::STROKE_WIDTH,
            fill_opacity: 1.0,
        }
    }

    /// Red outline, blue fill that starts fully transparent and fills in
    /// as collisions pile up
    pub fn player() -> Self {
        Self {
            fill: Color::BLUE,
            stroke: Color::RED,
            stroke_width: crate::consts::STROKE_WIDTH,
            fill_opacity: 0.0,
        }
    }
}

/// A timed move from one position to another
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Vec2,
    pub to: Vec2,
    pub elapsed_ms: f64,
    pub duration_ms: f64,
}

impl Transition {
    pub fn new(from: Vec2, to: Vec2, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0.0,
            duration_ms,
        }
    }

    /// Progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Interpolated position at the current progress
    pub fn position(&self) -> Vec2 {
        super::collision::interpolate(self.from, self.to, self.progress())
    }

    /// Advance by `dt_ms`; returns true once the transition has finished
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        self.elapsed_ms += dt_ms;
        self.progress() >= 1.0
    }
}

/// A positioned, styled game object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub role: Role,
    /// Current (possibly interpolated) center
    pub pos: Vec2,
    pub radius: f32,
    pub style: Style,
    /// In-flight move, enemies only
    #[serde(default)]
    pub transition: Option<Transition>,
}

impl Entity {
    pub fn new(role: Role, pos: Vec2, radius: f32, style: Style) -> Self {
        Self {
            role,
            pos,
            radius,
            style,
            transition: None,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.transition.is_some()
    }

    /// Start a move from the current position, superseding any move in flight
    pub fn move_to(&mut self, target: Vec2, duration_ms: f64) {
        self.transition = Some(Transition::new(self.pos, target, duration_ms));
    }

    /// Step the in-flight move and update `pos`
    pub fn advance_transition(&mut self, dt_ms: f64) {
        if let Some(transition) = self.transition.as_mut() {
            let done = transition.advance(dt_ms);
            self.pos = transition.position();
            if done {
                self.transition = None;
            }
        }
    }
}

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Timers and transitions advance
    Running,
    /// Frozen until resumed
    Paused,
    /// Torn down for good
    Stopped,
}

/// Things that happened during a tick, for whoever presents them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Every enemy got a new target and started moving
    EnemiesRepositioned,
    /// The player was dragged to a new (clamped) position
    PlayerMoved { pos: Vec2 },
    /// The score advanced
    ScoreTicked { score: u64 },
    /// A collision passed the debounce window and was counted
    CollisionOccurred { collisions: u64, best_score: u64 },
    /// The player node is due for a refresh
    PlayerRenderDue,
    Paused,
    Resumed,
    Stopped,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Immutable after construction
    pub options: GameOptions,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation clock (milliseconds since start, paused time excluded)
    pub clock_ms: f64,
    /// Simulation step counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub stats: GameStats,
    pub debounce: CollisionDebounce,
    /// Fixed-size; indices are stable identity keys for the scene
    pub enemies: Vec<Entity>,
    pub player: Entity,
    pub timers: Timers,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Validate the options and build the starting population
    pub fn new(options: GameOptions, seed: u64) -> Result<Self, ConfigError> {
        options.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let enemies = create_enemies(&mut rng, &options);
        let player = create_player(&mut rng, &options);

        log::info!(
            "New game: {}x{} field, {} enemies, seed {}",
            options.width,
            options.height,
            options.n_enemies,
            seed
        );

        Ok(Self {
            options,
            seed,
            rng,
            clock_ms: 0.0,
            time_ticks: 0,
            phase: GamePhase::Running,
            stats: GameStats::default(),
            debounce: CollisionDebounce::new(COLLISION_DEBOUNCE_MS),
            enemies,
            player,
            timers: Timers::default(),
            events: Vec::new(),
        })
    }

    /// Handle a collision signal at `now_ms`.
    ///
    /// Signals inside the debounce window are dropped. An accepted one counts
    /// the collision, banks the score as best if it beats it, resets the score
    /// and emits `CollisionOccurred`. Returns whether it was accepted.
    pub fn on_collision(&mut self, now_ms: f64) -> bool {
        if !self.debounce.accept(now_ms) {
            log::trace!(
                "Collision at {:.0}ms suppressed by debounce (last counted at {:?}ms)",
                now_ms,
                self.debounce.last_accepted_ms()
            );
            return false;
        }

        let score = self.stats.score;
        self.stats.record_collision();
        log::info!(
            "Collision #{} at {:.0}ms (score {} -> 0, best {})",
            self.stats.collisions,
            now_ms,
            score,
            self.stats.best_score
        );
        self.emit(GameEvent::CollisionOccurred {
            collisions: self.stats.collisions,
            best_score: self.stats.best_score,
        });
        true
    }

    /// Explicit teardown; the state stops advancing for good
    pub fn stop(&mut self) {
        if self.phase != GamePhase::Stopped {
            self.phase = GamePhase::Stopped;
            log::info!("Game stopped after {:.0}ms", self.clock_ms);
            self.emit(GameEvent::Stopped);
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events since the last drain, oldest first
    #[cfg(test)]
    pub(crate) fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
