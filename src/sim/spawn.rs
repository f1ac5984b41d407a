//! Random placement and entity construction

use glam::Vec2;
use rand::Rng;

use super::state::{Entity, Role, Style};
use crate::consts::SPAWN_MARGIN;
use crate::settings::GameOptions;

/// Random integer position inside the field, at least `SPAWN_MARGIN` pixels
/// from every edge.
///
/// Callers validate the options first; a field no larger than twice the margin
/// collapses every coordinate onto the margin itself.
pub fn random_position<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Vec2 {
    let span_x = width.saturating_sub(2 * SPAWN_MARGIN).max(1);
    let span_y = height.saturating_sub(2 * SPAWN_MARGIN).max(1);
    let x = rng.random_range(0..span_x) + SPAWN_MARGIN;
    let y = rng.random_range(0..span_y) + SPAWN_MARGIN;
    Vec2::new(x as f32, y as f32)
}

/// A black enemy at a random position
pub fn create_enemy<R: Rng + ?Sized>(rng: &mut R, options: &GameOptions) -> Entity {
    let pos = random_position(rng, options.width, options.height);
    Entity::new(Role::Enemy, pos, options.enemy_radius, Style::enemy())
}

/// The player at a random position
pub fn create_player<R: Rng + ?Sized>(rng: &mut R, options: &GameOptions) -> Entity {
    let pos = random_position(rng, options.width, options.height);
    Entity::new(Role::Player, pos, options.player_radius, Style::player())
}

/// `options.n_enemies` fresh enemies
pub fn create_enemies<R: Rng + ?Sized>(rng: &mut R, options: &GameOptions) -> Vec<Entity> {
    (0..options.n_enemies)
        .map(|_| create_enemy(rng, options))
        .collect()
}
