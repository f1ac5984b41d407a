//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (enemy index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{any_enemy_overlaps, circles_overlap, first_overlapping_enemy, interpolate};
pub use scoring::{CollisionDebounce, GameStats};
pub use spawn::{create_enemies, create_enemy, create_player, random_position};
pub use state::{Color, Entity, GameEvent, GamePhase, GameState, Role, Style, Transition};
pub use tick::{TickInput, clamp_drag, reposition_enemies, tick};
pub use timer::{PeriodicTimer, TimerFirings, Timers};
