/// Entities: Player and Enemy, plus the input/direction vocabulary.
///
/// Invariant: `health == 0` ⇔ animation state Dead. Dead entities stay in
/// the entity list (death is a state, not removal) but are excluded from
/// collision, AI, and drawing by their callers.

use super::animation::{AnimCycle, Sheet};
use super::units::Vec2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Animation / behavior state. Closed enum — no string tags.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnimState {
    Idle,
    Running,
    Jump,
    Fight,
    Dead,
}

/// Axis-aligned movement direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Left,
    Right,
    Up,
    Down,
}

impl Dir {
    /// Unit vector in world space (Y grows upward).
    pub fn unit(self) -> (f32, f32) {
        match self {
            Dir::Left => (-1.0, 0.0),
            Dir::Right => (1.0, 0.0),
            Dir::Up => (0.0, 1.0),
            Dir::Down => (0.0, -1.0),
        }
    }
}

/// Behavior policy tag. Parametrizes move speed and sprite sheet;
/// stats come from `CombatConfig`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyKind {
    Skeleton,
    Monster,
}

impl EnemyKind {
    pub fn sheet(self) -> Sheet {
        match self {
            EnemyKind::Skeleton => Sheet::Skeleton,
            EnemyKind::Monster => Sheet::Monster,
        }
    }
}

/// One frame's worth of sampled input, handed to the simulation by the
/// host adapter. Movement keys are level-triggered (held); attack is
/// edge-triggered (fresh press).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub attack: bool,
}

impl FrameInput {
    pub fn any_movement(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub health: u32,
    pub speed: f32, // world units per second
    pub facing: Facing,
    pub anim: AnimCycle,
}

impl Player {
    pub fn new(pos: Vec2, health: u32, speed: f32) -> Self {
        Player {
            pos,
            health,
            speed,
            facing: Facing::Right,
            anim: AnimCycle::new(AnimState::Idle),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// How far the player travels this frame, in world units.
    pub fn move_length(&self, dt: f32) -> f32 {
        self.speed * dt
    }

    /// Apply damage. Health saturates at 0 and death pins the Dead state.
    pub fn lose_health(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.anim.force_state(AnimState::Dead);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: usize,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: u32,
    pub speed: f32, // world units per second
    pub facing: Facing,
    pub anim: AnimCycle,
}

impl Enemy {
    pub fn new(id: usize, kind: EnemyKind, pos: Vec2, health: u32, speed: f32) -> Self {
        Enemy {
            id,
            kind,
            pos,
            health,
            speed,
            facing: Facing::Left,
            anim: AnimCycle::new(AnimState::Idle),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn move_length(&self, dt: f32) -> f32 {
        self.speed * dt
    }

    pub fn lose_health(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.anim.force_state(AnimState::Dead);
        }
    }

    /// Out-of-band enemies stop moving and idle in place.
    pub fn hold(&mut self) {
        self.anim.set_state(AnimState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_saturates_at_zero_and_pins_dead() {
        let mut e = Enemy::new(0, EnemyKind::Skeleton, Vec2::default(), 2, 10.0);
        e.lose_health(1);
        assert!(e.is_alive());
        assert_ne!(e.anim.state(), AnimState::Dead);
        e.lose_health(5);
        assert_eq!(e.health, 0);
        assert!(!e.is_alive());
        assert_eq!(e.anim.state(), AnimState::Dead);
    }

    #[test]
    fn dead_state_survives_set_state() {
        let mut p = Player::new(Vec2::default(), 1, 10.0);
        p.lose_health(1);
        p.anim.set_state(AnimState::Running);
        assert_eq!(p.anim.state(), AnimState::Dead);
    }

    #[test]
    fn move_length_scales_with_dt() {
        let p = Player::new(Vec2::default(), 10, 80.0);
        assert!((p.move_length(0.5) - 40.0).abs() < 1e-6);
        assert_eq!(p.move_length(0.0), 0.0);
    }
}
