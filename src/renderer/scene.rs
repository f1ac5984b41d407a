//! Retained scene graph fed from the simulation
//!
//! Nodes are keyed by their index in the entity collection: entering indices
//! get a node with every attribute set, existing ones only have their
//! position (and enemy fill) rewritten. The GPU pipeline draws whatever
//! `circles()` returns; the shell copies the scoreboard text into the page.

use glam::Vec2;

use crate::consts::FEEDBACK_OPACITY_STEP;
use crate::sim::{Color, Entity, GameEvent, GameState, GameStats, Role};

/// Attribute map of one circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeAttrs {
    pub center: Vec2,
    pub radius: f32,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    pub fill_opacity: f32,
}

impl ShapeAttrs {
    fn from_entity(entity: &Entity) -> Self {
        Self {
            center: entity.pos,
            radius: entity.radius,
            fill: entity.style.fill,
            stroke: entity.style.stroke,
            stroke_width: entity.style.stroke_width,
            fill_opacity: entity.style.fill_opacity,
        }
    }
}

/// A scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeNode {
    /// Index in the collection this node was joined from
    pub key: usize,
    pub role: Role,
    pub attrs: ShapeAttrs,
}

/// Outcome of a data join
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinResult {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// Scoreboard text values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub current: String,
    pub best: String,
    pub collisions: String,
}

/// Scene graph mirror of the game
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub enemies: Vec<ShapeNode>,
    pub player: Option<ShapeNode>,
    pub scoreboard: Scoreboard,
    /// Set whenever the scoreboard text changes, cleared by the shell
    pub scoreboard_dirty: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene showing the state as it is right now
    pub fn from_state(state: &GameState) -> Self {
        let mut scene = Self::new();
        scene.join_enemies(&state.enemies);
        scene.join_player(&state.player);
        scene.update_scoreboard(&state.stats);
        scene
    }

    /// Reconcile enemy nodes with the enemy list
    pub fn join_enemies(&mut self, enemies: &[Entity]) -> JoinResult {
        let mut result = JoinResult::default();

        for (key, enemy) in enemies.iter().enumerate() {
            match self.enemies.get_mut(key) {
                Some(node) => {
                    node.attrs.center = enemy.pos;
                    node.attrs.fill = Color::BLACK;
                    result.updated += 1;
                }
                None => {
                    self.enemies.push(ShapeNode {
                        key,
                        role: Role::Enemy,
                        attrs: ShapeAttrs::from_entity(enemy),
                    });
                    result.entered += 1;
                }
            }
        }

        if self.enemies.len() > enemies.len() {
            result.exited = self.enemies.len() - enemies.len();
            self.enemies.truncate(enemies.len());
        }

        result
    }

    /// Create the player node on first call; returns whether it was created
    pub fn join_player(&mut self, player: &Entity) -> bool {
        if self.player.is_some() {
            return false;
        }
        self.player = Some(ShapeNode {
            key: 0,
            role: Role::Player,
            attrs: ShapeAttrs::from_entity(player),
        });
        true
    }

    /// Move the player node directly (drag path)
    pub fn set_player_transform(&mut self, pos: Vec2) {
        if let Some(node) = self.player.as_mut() {
            node.attrs.center = pos;
        }
    }

    /// Copy interpolated enemy positions into their nodes
    pub fn sync_positions(&mut self, enemies: &[Entity]) {
        for (node, enemy) in self.enemies.iter_mut().zip(enemies) {
            node.attrs.center = enemy.pos;
        }
    }

    /// Rewrite the scoreboard text; returns whether anything changed
    pub fn update_scoreboard(&mut self, stats: &GameStats) -> bool {
        let next = Scoreboard {
            current: stats.score.to_string(),
            best: stats.best_score.to_string(),
            collisions: stats.collisions.to_string(),
        };
        if next == self.scoreboard {
            return false;
        }
        self.scoreboard = next;
        self.scoreboard_dirty = true;
        true
    }

    /// React to a simulation event
    pub fn apply_event(&mut self, event: &GameEvent, state: &GameState) {
        match *event {
            GameEvent::EnemiesRepositioned => {
                self.join_enemies(&state.enemies);
            }
            GameEvent::PlayerMoved { pos } => self.set_player_transform(pos),
            GameEvent::PlayerRenderDue => {
                self.join_player(&state.player);
            }
            GameEvent::ScoreTicked { .. } => {
                self.update_scoreboard(&state.stats);
            }
            GameEvent::CollisionOccurred { collisions, .. } => {
                if let Some(node) = self.player.as_mut() {
                    node.attrs.fill_opacity = feedback_opacity(collisions);
                }
                self.update_scoreboard(&state.stats);
            }
            GameEvent::Paused | GameEvent::Resumed | GameEvent::Stopped => {}
        }
    }

    /// Every circle in draw order: enemies first, player on top
    pub fn circles(&self) -> impl Iterator<Item = &ShapeAttrs> {
        self.enemies
            .iter()
            .chain(self.player.iter())
            .map(|node| &node.attrs)
    }
}

/// Player fill opacity after `collisions` counted hits
pub fn feedback_opacity(collisions: u64) -> f32 {
    (collisions as f32 * FEEDBACK_OPACITY_STEP).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_MS;
    use crate::settings::GameOptions;
    use crate::sim::{Style, TickInput, tick};

    fn enemy(x: f32, y: f32) -> Entity {
        Entity::new(Role::Enemy, Vec2::new(x, y), 7.0, Style::enemy())
    }

    #[test]
    fn test_join_enters_then_updates() {
        let mut scene = Scene::new();
        let mut enemies = vec![enemy(60.0, 60.0), enemy(100.0, 120.0)];

        let first = scene.join_enemies(&enemies);
        assert_eq!(first, JoinResult { entered: 2, updated: 0, exited: 0 });
        assert_eq!(scene.enemies[1].key, 1);
        assert_eq!(scene.enemies[1].attrs.center, Vec2::new(100.0, 120.0));

        enemies[1].pos = Vec2::new(300.0, 200.0);
        let second = scene.join_enemies(&enemies);
        assert_eq!(second, JoinResult { entered: 0, updated: 2, exited: 0 });
        assert_eq!(scene.enemies.len(), 2);
        assert_eq!(scene.enemies[1].attrs.center, Vec2::new(300.0, 200.0));
    }

    #[test]
    fn test_join_removes_extra_nodes() {
        let mut scene = Scene::new();
        scene.join_enemies(&[enemy(60.0, 60.0), enemy(70.0, 70.0), enemy(80.0, 80.0)]);
        let result = scene.join_enemies(&[enemy(60.0, 60.0)]);
        assert_eq!(result.exited, 2);
        assert_eq!(scene.enemies.len(), 1);
    }

    #[test]
    fn test_player_joined_once() {
        let mut scene = Scene::new();
        let mut player = Entity::new(Role::Player, Vec2::new(200.0, 200.0), 7.0, Style::player());
        assert!(scene.join_player(&player));

        player.pos = Vec2::new(10.0, 10.0);
        assert!(!scene.join_player(&player));
        assert_eq!(scene.player.unwrap().attrs.center, Vec2::new(200.0, 200.0));

        scene.set_player_transform(player.pos);
        assert_eq!(scene.player.unwrap().attrs.center, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_scoreboard_dirty_only_on_change() {
        let mut scene = Scene::new();
        let stats = GameStats {
            score: 12,
            best_score: 40,
            collisions: 2,
        };
        assert!(scene.update_scoreboard(&stats));
        assert_eq!(scene.scoreboard.current, "12");
        assert_eq!(scene.scoreboard.best, "40");
        assert_eq!(scene.scoreboard.collisions, "2");

        scene.scoreboard_dirty = false;
        assert!(!scene.update_scoreboard(&stats));
        assert!(!scene.scoreboard_dirty);
    }

    #[test]
    fn test_feedback_opacity_grows_and_saturates() {
        assert_eq!(feedback_opacity(0), 0.0);
        assert!((feedback_opacity(3) - 0.3).abs() < 1e-6);
        assert_eq!(feedback_opacity(25), 1.0);
    }

    #[test]
    fn test_collision_event_updates_player_and_scoreboard() {
        let mut state = GameState::new(GameOptions::default(), 11).unwrap();
        let mut scene = Scene::from_state(&state);
        assert_eq!(scene.player.unwrap().attrs.fill_opacity, 0.0);

        for _ in 0..4 {
            state.stats.tick();
        }
        state.on_collision(0.0);
        for event in state.drain_events() {
            scene.apply_event(&event, &state);
        }

        let player = scene.player.unwrap();
        assert!((player.attrs.fill_opacity - FEEDBACK_OPACITY_STEP).abs() < 1e-6);
        assert_eq!(scene.scoreboard.best, "4");
        assert_eq!(scene.scoreboard.collisions, "1");
    }

    #[test]
    fn test_enemies_visible_before_first_reposition() {
        let mut state = GameState::new(GameOptions::default(), 13).unwrap();
        state.player.pos = state.enemies[0].pos;
        let mut scene = Scene::from_state(&state);
        assert_eq!(scene.enemies.len(), state.enemies.len());

        // Just short of the first reposition, while collisions are already counted
        for _ in 0..174 {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
            for event in state.drain_events() {
                scene.apply_event(&event, &state);
            }
            scene.sync_positions(&state.enemies);
        }

        assert!(state.enemies.iter().all(|e| !e.is_moving()));
        assert!(state.stats.collisions > 0);
        assert_eq!(scene.enemies.len(), state.enemies.len());
        assert_eq!(scene.circles().count(), state.enemies.len() + 1);
        assert_eq!(scene.enemies[0].attrs.center, state.enemies[0].pos);
        assert_eq!(scene.scoreboard.collisions, state.stats.collisions.to_string());
    }

    #[test]
    fn test_scene_follows_simulation() {
        let mut state = GameState::new(GameOptions::default(), 12).unwrap();
        state.player.pos = Vec2::new(5.0, 5.0);
        let mut scene = Scene::from_state(&state);

        for _ in 0..240 {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
            for event in state.drain_events() {
                scene.apply_event(&event, &state);
            }
            scene.sync_positions(&state.enemies);
        }

        // 4 seconds in: the first reposition updated the existing nodes
        assert_eq!(scene.enemies.len(), state.enemies.len());
        assert!(scene.player.is_some());
        for (node, enemy) in scene.enemies.iter().zip(&state.enemies) {
            assert_eq!(node.attrs.center, enemy.pos);
        }
        assert_eq!(scene.scoreboard.current, state.stats.score.to_string());
        assert_eq!(scene.circles().count(), state.enemies.len() + 1);
    }
}
