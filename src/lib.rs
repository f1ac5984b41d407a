//! Watchout - dodge the wandering enemies
//!
//! Core modules:
//! - `sim`: Deterministic simulation (timers, transitions, collisions, scoring)
//! - `renderer`: Scene bridge and WebGPU rendering pipeline
//! - `settings`: Game options (field size, enemy count, radii)
//! - `error`: Configuration and renderer errors

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, RenderError};
pub use settings::GameOptions;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate
    pub const SIM_HZ: f64 = 60.0;
    /// Fixed simulation timestep in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / SIM_HZ;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (tab switches, debugger pauses)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Spawn positions keep this many pixels away from every field edge
    pub const SPAWN_MARGIN: u32 = 50;

    /// Default circle radius for enemies and the player
    pub const ENTITY_RADIUS: f32 = 7.0;
    /// Default stroke width for every circle
    pub const STROKE_WIDTH: f32 = 1.0;

    /// Enemies pick new targets this often
    pub const REPOSITION_INTERVAL_MS: f64 = 3000.0;
    /// Duration of an enemy's move to its new target
    pub const TRANSITION_MS: f64 = 3000.0;
    /// Player node refresh cadence
    pub const PLAYER_RENDER_INTERVAL_MS: f64 = 10.0;
    /// One point of score per interval survived
    pub const SCORE_INTERVAL_MS: f64 = 30.0;
    /// Minimum time between two accepted collisions
    pub const COLLISION_DEBOUNCE_MS: f64 = 1000.0;

    /// Drag clamp as a fraction of the field size
    pub const DRAG_MAX_X_FRACTION: f32 = 0.93;
    pub const DRAG_MAX_Y_FRACTION: f32 = 0.75;

    /// Player fill opacity gained per accepted collision
    pub const FEEDBACK_OPACITY_STEP: f32 = 0.1;

    /// Enemies the renderer can draw (one circle slot is reserved for the player)
    pub const MAX_ENEMIES: usize = 63;
}
