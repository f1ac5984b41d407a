//! Circle collision detection
//!
//! Everything in this game is a circle, so a collision is simply two centers
//! closer than the sum of their radii.

use glam::Vec2;

use super::state::Entity;

/// Linear interpolation: `from + (to - from) * t`
#[inline]
pub fn interpolate(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

/// True if two circles overlap (touching edges do not count)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

/// Overlap test between two entities at their current positions
#[inline]
pub fn entities_overlap(a: &Entity, b: &Entity) -> bool {
    circles_overlap(a.pos, a.radius, b.pos, b.radius)
}

/// Index of the first enemy touching the player, moving or not
pub fn first_overlapping_enemy(enemies: &[Entity], player: &Entity) -> Option<usize> {
    enemies.iter().position(|enemy| entities_overlap(enemy, player))
}

/// True if any enemy touches the player
pub fn any_enemy_overlaps(enemies: &[Entity], player: &Entity) -> bool {
    first_overlapping_enemy(enemies, player).is_some()
}
