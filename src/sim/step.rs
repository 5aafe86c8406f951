/// The step function: advances the world by one frame.
///
/// Processing order (single synchronous pass):
///   1. Player movement (per-axis independent collision checks)
///   2. Enemy behavior, in list order (chase band / hold / contact damage)
///   3. Melee attack resolution (edge input, cooldown gated)
///   4. Animation accumulator update (all entities, dead included)
///   5. Effect-queue drain (one entry dequeued per frame)
///   6. Outcome check (game over / victory)
///
/// Known, deliberately preserved quirks:
///   - Diagonal movement checks each axis independently, so diagonal speed
///     exceeds per-axis speed.
///   - Contact damage is continuous: every frame inside the contact radius
///     costs health again.

use crate::domain::animation::{Sheet, SWORD_SWING};
use crate::domain::behavior;
use crate::domain::entity::{AnimState, Dir, Facing, FrameInput};
use crate::domain::units::{distance, to_sprite_units, Vec2, SPRITE_SIZE_WORLD_UNIT};
use rand::Rng;

use super::event::GameEvent;
use super::world::{EffectSprite, Phase, WorldState};

/// How long the Fight pose lingers after a swing (full fight sequence).
const FIGHT_LINGER: f32 = 0.32;

pub fn step(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    if world.phase != Phase::Playing {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.attack_timer += dt;

    if world.message_timer > 0.0 {
        world.message_timer -= dt;
        if world.message_timer <= 0.0 {
            world.message.clear();
            world.message_timer = 0.0;
        }
    }

    let moved = resolve_player_movement(world, &input, dt);
    resolve_enemy_behavior(world, dt, &mut events);
    let attacked = resolve_attack(world, &input, &mut events);
    resolve_player_state(world, &input, moved, attacked);
    resolve_animation(world, dt);
    resolve_effects(world);
    resolve_outcome(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player movement
// ══════════════════════════════════════════════════════════════

/// Each held direction is checked against the collision map independently
/// and applied on its own. Returns true if any translation was applied.
fn resolve_player_movement(world: &mut WorldState, input: &FrameInput, dt: f32) -> bool {
    if !world.player.is_alive() {
        return false;
    }

    let dist = world.player.move_length(dt);
    let mut moved = false;

    let wants: [(bool, Dir); 4] = [
        (input.down, Dir::Down),
        (input.up, Dir::Up),
        (input.right, Dir::Right),
        (input.left, Dir::Left),
    ];

    for (held, dir) in wants {
        if !held {
            continue;
        }
        let p = world.player.pos;
        if world.level.can_move(dir, p.x, p.y, dist) {
            let (dx, dy) = dir.unit();
            world.player.pos.x += dx * dist;
            world.player.pos.y += dy * dist;
            moved = true;
        }
        match dir {
            Dir::Left => world.player.facing = Facing::Left,
            Dir::Right => world.player.facing = Facing::Right,
            _ => {}
        }
    }

    moved
}

// ══════════════════════════════════════════════════════════════
// Enemy behavior
// ══════════════════════════════════════════════════════════════

fn resolve_enemy_behavior(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    for i in 0..world.enemies.len() {
        if !world.enemies[i].is_alive() {
            continue;
        }

        let epos = world.enemies[i].pos;
        let move_len = world.enemies[i].move_length(dt);
        let decision = behavior::decide(
            &world.level,
            epos,
            move_len,
            world.player.pos,
            world.player.is_alive(),
        );

        if decision.hold {
            world.enemies[i].hold();
        } else {
            let mut stepped = false;
            if let Some(dir) = decision.move_x {
                let (dx, _) = dir.unit();
                world.enemies[i].pos.x += dx * move_len;
                world.enemies[i].facing = if dx < 0.0 { Facing::Left } else { Facing::Right };
                stepped = true;
            }
            if let Some(dir) = decision.move_y {
                let (_, dy) = dir.unit();
                world.enemies[i].pos.y += dy * move_len;
                stepped = true;
            }
            if stepped {
                world.enemies[i].anim.set_state(AnimState::Running);
            }
        }

        if decision.contact {
            let was_alive = world.player.is_alive();
            world.player.lose_health(world.combat.contact_damage);
            events.push(GameEvent::PlayerHurt);
            if was_alive && !world.player.is_alive() {
                events.push(GameEvent::PlayerDied);
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Melee attack
// ══════════════════════════════════════════════════════════════

/// Edge-triggered attack input, gated by the cooldown timer. On a
/// successful trigger every live enemy in reach takes damage and a
/// weighted-random grunt variant is chosen per hit; the sword-swing
/// transient is enqueued as four one-shot draw requests.
fn resolve_attack(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) -> bool {
    if !world.player.is_alive() || !input.attack {
        return false;
    }
    if world.attack_timer < world.combat.attack_cooldown {
        return false;
    }
    world.attack_timer = 0.0;
    events.push(GameEvent::SwordSwing);

    let ppos = world.player.pos;
    let reach = world.combat.attack_range;
    for i in 0..world.enemies.len() {
        if !world.enemies[i].is_alive() {
            continue;
        }
        let d = to_sprite_units(distance(ppos, world.enemies[i].pos));
        if d.is_finite() && d < reach {
            world.enemies[i].lose_health(world.combat.attack_damage);
            let variant = grunt_variant(&mut world.rng);
            events.push(GameEvent::EnemyHurt {
                id: world.enemies[i].id,
                kind: world.enemies[i].kind,
                variant,
            });
            if !world.enemies[i].is_alive() {
                events.push(GameEvent::EnemyDied {
                    id: world.enemies[i].id,
                    kind: world.enemies[i].kind,
                });
            }
        }
    }

    // Sword transient, offset to the player's weapon side
    let fx = Vec2::new(
        ppos.x + SPRITE_SIZE_WORLD_UNIT * 2.0 / 3.0,
        ppos.y + SPRITE_SIZE_WORLD_UNIT / 3.0,
    );
    for &cell in SWORD_SWING {
        world.effects.push_back(EffectSprite { cell, pos: fx });
    }

    true
}

/// Three-way weighted grunt choice, fresh draw per branch:
/// r1 > 0.5 → 1, else r2 > 0.7 → 2, else 3.
fn grunt_variant<R: Rng>(rng: &mut R) -> u8 {
    if rng.gen::<f32>() > 0.5 {
        1
    } else if rng.gen::<f32>() > 0.7 {
        2
    } else {
        3
    }
}

// ══════════════════════════════════════════════════════════════
// Player animation state
// ══════════════════════════════════════════════════════════════

fn resolve_player_state(world: &mut WorldState, input: &FrameInput, moved: bool, attacked: bool) {
    if !world.player.is_alive() {
        return; // Dead is pinned by lose_health
    }
    if attacked {
        world.player.anim.set_state(AnimState::Fight);
        return;
    }
    // Let the fight pose play out before downgrading
    if world.player.anim.state() == AnimState::Fight && world.attack_timer < FIGHT_LINGER {
        return;
    }
    if input.jump {
        world.player.anim.set_state(AnimState::Jump);
    } else if moved {
        world.player.anim.set_state(AnimState::Running);
    } else {
        world.player.anim.set_state(AnimState::Idle);
    }
}

// ══════════════════════════════════════════════════════════════
// Animation / effects / outcome
// ══════════════════════════════════════════════════════════════

fn resolve_animation(world: &mut WorldState, dt: f32) {
    world.player.anim.advance(dt, Sheet::Hero);
    for e in &mut world.enemies {
        // Dead enemies keep accumulating; they are simply never drawn
        e.anim.advance(dt, e.kind.sheet());
    }
}

fn resolve_effects(world: &mut WorldState) {
    world.current_effect = world.effects.pop_front();
}

fn resolve_outcome(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.player.is_alive() {
        world.phase = Phase::GameOver;
        world.set_message("You have fallen. [R] Restart", 0.0);
        return;
    }
    if world.live_enemy_count() == 0 {
        world.phase = Phase::Victory;
        events.push(GameEvent::Victory);
        world.set_message("The glade is quiet again.", 0.0);
    }
}

/// Reset the session to a fresh run of the map, preserving debug toggles.
pub fn restart(world: &mut WorldState) {
    let combat = world.combat.clone();
    let speed = world.speed.clone();
    let show_grid = world.show_grid;
    let show_coords = world.show_coords;
    *world = WorldState::new(combat, speed);
    world.show_grid = show_grid;
    world.show_coords = show_coords;
    world.phase = Phase::Playing;
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::{Enemy, EnemyKind, Player};
    use crate::domain::level::Level;
    use crate::domain::units::to_world_units;

    const FRAME: f32 = 1.0 / 60.0;

    fn world_from(rows: &[&str]) -> WorldState {
        let cfg = GameConfig::default();
        let mut w = WorldState::new(cfg.combat.clone(), cfg.speed.clone());
        let (level, spawns) = Level::parse(rows);
        w.level = level;
        w.player = Player::new(
            spawns.player,
            w.combat.player_max_health,
            w.speed.player_speed,
        );
        w.enemies.clear();
        let mut id = 0;
        for pos in &spawns.skeletons {
            w.enemies.push(Enemy::new(
                id,
                EnemyKind::Skeleton,
                *pos,
                w.combat.enemy_health,
                w.speed.skeleton_speed,
            ));
            id += 1;
        }
        for pos in &spawns.monsters {
            w.enemies.push(Enemy::new(
                id,
                EnemyKind::Monster,
                *pos,
                w.combat.enemy_health,
                w.speed.monster_speed,
            ));
            id += 1;
        }
        w.effects.clear();
        w.current_effect = None;
        w.phase = Phase::Playing;
        w
    }

    fn idle_input() -> FrameInput {
        FrameInput::default()
    }

    #[test]
    fn blocked_direction_leaves_position_unchanged() {
        // Player wedged in the corner against trees
        let mut w = world_from(&[
            "TTTT",
            "T..T",
            "TP.T",
            "TTTT",
        ]);
        let before = w.player.pos;
        let input = FrameInput { left: true, down: true, ..idle_input() };
        step(&mut w, input, FRAME);
        assert_eq!(w.player.pos, before);
    }

    #[test]
    fn open_direction_translates_by_move_length() {
        let mut w = world_from(&[
            "TTTTTT",
            "T....T",
            "T.P..T",
            "T....T",
            "TTTTTT",
        ]);
        let before = w.player.pos;
        let input = FrameInput { right: true, ..idle_input() };
        step(&mut w, input, FRAME);
        let expected = w.player.move_length(FRAME);
        assert!((w.player.pos.x - before.x - expected).abs() < 1e-4);
        assert_eq!(w.player.pos.y, before.y);
    }

    #[test]
    fn diagonal_applies_both_axes_independently() {
        // The documented quirk: both axes move their full per-axis length.
        let mut w = world_from(&[
            "TTTTTT",
            "T....T",
            "T.P..T",
            "T....T",
            "TTTTTT",
        ]);
        let before = w.player.pos;
        let input = FrameInput { right: true, up: true, ..idle_input() };
        step(&mut w, input, FRAME);
        let d = w.player.move_length(FRAME);
        assert!((w.player.pos.x - before.x - d).abs() < 1e-4);
        assert!((w.player.pos.y - before.y - d).abs() < 1e-4);
    }

    #[test]
    fn continuous_contact_damage_accumulates_per_frame() {
        // Enemy sharing the player's cell: distance 0 < contact range.
        let mut w = world_from(&[
            "TTTTTT",
            "T....T",
            "T.P..T",
            "T....T",
            "TTTTTT",
        ]);
        w.enemies.push(Enemy::new(
            0,
            EnemyKind::Skeleton,
            w.player.pos,
            w.combat.enemy_health,
            0.0,
        ));
        let start = w.player.health;
        let n = 4;
        for _ in 0..n {
            step(&mut w, idle_input(), FRAME);
        }
        assert_eq!(w.player.health, start - n * w.combat.contact_damage);
    }

    #[test]
    fn three_frames_in_range_cost_three_damage_then_death_clamps() {
        let mut w = world_from(&[
            "TTTTTT",
            "T....T",
            "T.P..T",
            "T....T",
            "TTTTTT",
        ]);
        w.combat.player_max_health = 3;
        w.player.health = 3;
        w.enemies.push(Enemy::new(
            0,
            EnemyKind::Monster,
            w.player.pos,
            w.combat.enemy_health,
            0.0,
        ));

        let mut died_events = 0;
        for _ in 0..5 {
            let events = step(&mut w, idle_input(), FRAME);
            died_events += events
                .iter()
                .filter(|e| matches!(e, GameEvent::PlayerDied))
                .count();
        }
        // Health clamped at zero, Dead state reached, died exactly once
        assert_eq!(w.player.health, 0);
        assert_eq!(w.player.anim.state(), AnimState::Dead);
        assert_eq!(died_events, 1);
        assert_eq!(w.phase, Phase::GameOver);
    }

    #[test]
    fn attack_cooldown_allows_only_one_swing() {
        let mut w = world_from(&[
            "TTTTTT",
            "T....T",
            "T.PS.T",
            "T....T",
            "TTTTTT",
        ]);
        let enemy_start = w.enemies[0].health;
        let attack = FrameInput { attack: true, ..idle_input() };

        let first = step(&mut w, attack, FRAME);
        let second = step(&mut w, attack, FRAME); // well inside the cooldown

        let swings = |evs: &[GameEvent]| {
            evs.iter()
                .filter(|e| matches!(e, GameEvent::SwordSwing))
                .count()
        };
        assert_eq!(swings(&first), 1);
        assert_eq!(swings(&second), 0);
        assert_eq!(w.enemies[0].health, enemy_start - w.combat.attack_damage);
        // One swing enqueued exactly one sword transient burst; one frame
        // of it has already been dequeued per step.
        assert_eq!(w.effects.len(), SWORD_SWING.len() - 2);
    }

    #[test]
    fn attack_after_cooldown_fires_again() {
        // Skeleton 3.0 units out: beyond the chase band and contact
        // range, so the idle wait leaves the player untouched.
        let mut w = world_from(&[
            "TTTTTTT",
            "T.....T",
            "T.P..ST",
            "T.....T",
            "TTTTTTT",
        ]);
        let attack = FrameInput { attack: true, ..idle_input() };
        step(&mut w, attack, FRAME);
        // Let the cooldown elapse with idle frames
        let frames = (w.combat.attack_cooldown / FRAME).ceil() as usize + 1;
        for _ in 0..frames {
            step(&mut w, idle_input(), FRAME);
        }
        let events = step(&mut w, attack, FRAME);
        assert!(events.iter().any(|e| matches!(e, GameEvent::SwordSwing)));
    }

    #[test]
    fn attack_only_hits_enemies_in_reach() {
        let mut w = world_from(&[
            "TTTTTTTTTT",
            "T........T",
            "T.P.....ST",
            "T........T",
            "TTTTTTTTTT",
        ]);
        // Add a second enemy right next to the player
        let near = Vec2::new(
            w.player.pos.x + to_world_units(1.0),
            w.player.pos.y,
        );
        w.enemies.push(Enemy::new(
            9,
            EnemyKind::Monster,
            near,
            w.combat.enemy_health,
            0.0,
        ));
        let far_start = w.enemies[0].health;
        let near_start = w.enemies[1].health;

        let attack = FrameInput { attack: true, ..idle_input() };
        step(&mut w, attack, FRAME);

        assert_eq!(w.enemies[0].health, far_start); // out of reach
        assert_eq!(w.enemies[1].health, near_start - w.combat.attack_damage);
    }

    #[test]
    fn effect_queue_drains_one_per_frame() {
        // The far-off skeleton keeps the session in Playing while the
        // queue drains; it is beyond the chase band and attack reach.
        let mut w = world_from(&[
            "TTTTTTTTT",
            "T.......T",
            "T.P....ST",
            "T.......T",
            "TTTTTTTTT",
        ]);
        let attack = FrameInput { attack: true, ..idle_input() };
        step(&mut w, attack, FRAME); // enqueue 4, dequeue 1
        assert!(w.current_effect.is_some());
        assert_eq!(w.effects.len(), SWORD_SWING.len() - 1);

        for left in (0..SWORD_SWING.len() - 1).rev() {
            step(&mut w, idle_input(), FRAME);
            assert_eq!(w.effects.len(), left);
        }
        // Queue exhausted: nothing left to draw
        step(&mut w, idle_input(), FRAME);
        assert!(w.current_effect.is_none());
    }

    #[test]
    fn enemy_at_two_and_a_half_units_closes_in_then_holds() {
        // Wide open field; enemy 2.5 sprite units away diagonally.
        let mut w = world_from(&[
            "TTTTTTTTTTTT",
            "T..........T",
            "T..........T",
            "T..........T",
            "T..........T",
            "T...P......T",
            "T..........T",
            "TTTTTTTTTTTT",
        ]);
        // ~2.5 units: 1.5 right, 2.0 up
        let start = Vec2::new(
            w.player.pos.x + to_world_units(1.5),
            w.player.pos.y + to_world_units(2.0),
        );
        w.enemies.push(Enemy::new(
            0,
            EnemyKind::Skeleton,
            start,
            w.combat.enemy_health,
            w.speed.skeleton_speed,
        ));

        let mut reached = false;
        for _ in 0..600 {
            step(&mut w, idle_input(), FRAME);
            let d = to_sprite_units(distance(w.player.pos, w.enemies[0].pos));
            if d < behavior::CHASE_MIN {
                reached = true;
                break;
            }
        }
        assert!(reached, "enemy never closed inside the chase band");

        // Below the band: the enemy holds position from here on
        let held_at = w.enemies[0].pos;
        step(&mut w, idle_input(), FRAME);
        assert_eq!(w.enemies[0].pos, held_at);
        assert_eq!(w.enemies[0].anim.state(), AnimState::Idle);
    }

    #[test]
    fn dead_enemies_are_skipped_by_behavior_and_attack() {
        let mut w = world_from(&[
            "TTTTTT",
            "T....T",
            "T.PS.T",
            "T....T",
            "TTTTTT",
        ]);
        w.enemies[0].lose_health(u32::MAX);
        let corpse_at = w.enemies[0].pos;
        let health_before = w.player.health;

        let attack = FrameInput { attack: true, ..idle_input() };
        let events = step(&mut w, attack, FRAME);

        // Still in the list, but untouched and harmless
        assert_eq!(w.enemies.len(), 1);
        assert_eq!(w.enemies[0].pos, corpse_at);
        assert_eq!(w.player.health, health_before);
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::EnemyHurt { .. })));
    }

    #[test]
    fn killing_last_enemy_wins_the_session() {
        let mut w = world_from(&[
            "TTTTTT",
            "T....T",
            "T.PS.T",
            "T....T",
            "TTTTTT",
        ]);
        w.enemies[0].health = 1;
        let attack = FrameInput { attack: true, ..idle_input() };
        let events = step(&mut w, attack, FRAME);
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyDied { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Victory)));
        assert_eq!(w.phase, Phase::Victory);
    }

    #[test]
    fn step_is_inert_outside_playing_phase() {
        let mut w = world_from(&[
            "TTTT",
            "TP.T",
            "TTTT",
        ]);
        w.phase = Phase::GameOver;
        let before = w.player.pos;
        let events = step(&mut w, FrameInput { right: true, ..idle_input() }, FRAME);
        assert!(events.is_empty());
        assert_eq!(w.player.pos, before);
    }

    #[test]
    fn restart_rebuilds_world_and_keeps_toggles() {
        let mut w = world_from(&["TP.S", "...."]);
        w.show_grid = true;
        w.player.lose_health(u32::MAX);
        restart(&mut w);
        assert_eq!(w.phase, Phase::Playing);
        assert!(w.player.is_alive());
        assert!(w.show_grid);
    }
}
