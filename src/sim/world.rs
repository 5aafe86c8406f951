/// WorldState: the complete snapshot of a running session.
///
/// All mutable game containers (entity list, effect queue) live here as
/// owned fields and are threaded explicitly through the step functions —
/// no ambient globals. The level grid is immutable after load.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::{CombatConfig, SpeedConfig};
use crate::domain::animation::SpriteCell;
use crate::domain::entity::{Enemy, EnemyKind, Player};
use crate::domain::level::Level;
use crate::domain::units::Vec2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    GameOver,
    Victory,
}

/// A one-shot positioned draw request: one sprite cell at a world position,
/// drawn for a single frame then discarded.
#[derive(Clone, Copy, Debug)]
pub struct EffectSprite {
    pub cell: SpriteCell,
    pub pos: Vec2,
}

pub struct WorldState {
    // ── Static terrain ──
    pub level: Level,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,

    // ── Transient effects (FIFO, one dequeued per frame) ──
    pub effects: VecDeque<EffectSprite>,
    /// The effect dequeued this frame, if any. Drawn once by the renderer.
    pub current_effect: Option<EffectSprite>,

    // ── Combat timers ──
    /// Seconds since the last melee swing fired.
    pub attack_timer: f32,

    // ── Config ──
    pub combat: CombatConfig,
    pub speed: SpeedConfig,

    // ── Meta ──
    pub phase: Phase,
    pub tick: u64,
    pub rng: SmallRng,

    // ── UI ──
    pub message: String,
    pub message_timer: f32,
    pub show_grid: bool,
    pub show_coords: bool,
}

impl WorldState {
    pub fn new(combat: CombatConfig, speed: SpeedConfig) -> Self {
        let (level, spawns) = Level::default_map();
        let player = Player::new(spawns.player, combat.player_max_health, speed.player_speed);

        let mut enemies = Vec::new();
        let mut id = 0;
        for pos in &spawns.skeletons {
            enemies.push(Enemy::new(
                id,
                EnemyKind::Skeleton,
                *pos,
                combat.enemy_health,
                speed.skeleton_speed,
            ));
            id += 1;
        }
        for pos in &spawns.monsters {
            enemies.push(Enemy::new(
                id,
                EnemyKind::Monster,
                *pos,
                combat.enemy_health,
                speed.monster_speed,
            ));
            id += 1;
        }

        WorldState {
            level,
            player,
            enemies,
            effects: VecDeque::new(),
            current_effect: None,
            // Start ready to swing: the first attack should not wait out
            // a cooldown that never began.
            attack_timer: combat.attack_cooldown,
            combat,
            speed,
            phase: Phase::Title,
            tick: 0,
            rng: SmallRng::from_entropy(),
            message: String::new(),
            message_timer: 0.0,
            show_grid: false,
            show_coords: false,
        }
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn set_message(&mut self, msg: &str, seconds: f32) {
        self.message = msg.to_string();
        self.message_timer = seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn default_world_spawns_player_and_enemies() {
        let cfg = GameConfig::default();
        let world = WorldState::new(cfg.combat.clone(), cfg.speed.clone());
        assert!(world.player.is_alive());
        assert!(world.live_enemy_count() >= 2);
        assert_eq!(world.phase, Phase::Title);
        assert!(world.effects.is_empty());
    }

    #[test]
    fn enemy_kinds_get_their_speeds() {
        let cfg = GameConfig::default();
        let world = WorldState::new(cfg.combat.clone(), cfg.speed.clone());
        for e in &world.enemies {
            let expected = match e.kind {
                EnemyKind::Skeleton => cfg.speed.skeleton_speed,
                EnemyKind::Monster => cfg.speed.monster_speed,
            };
            assert_eq!(e.speed, expected);
        }
    }
}
