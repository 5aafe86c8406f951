/// Enemy behavior: a pure per-frame decision function.
///
/// Ranges are in sprite-grid units:
///   - `[CHASE_MIN, CHASE_MAX)` — chase band. Closed lower bound, open
///     upper bound. Inside it the enemy steps toward the player on each
///     axis independently (same diagonal-speed quirk as player movement).
///   - outside the band — hold position, idle animation.
///   - `< CONTACT_RANGE` — the player takes contact damage every frame the
///     condition holds (continuous, not edge-triggered) and a hurt grunt
///     is requested.
///
/// A non-finite distance (e.g. NaN from degenerate input) resolves to the
/// hold branch: no movement, no damage.

use super::entity::Dir;
use super::level::Level;
use super::units::{distance, to_sprite_units, Vec2};

/// Chase band, sprite-grid units. Lower bound inclusive, upper exclusive.
pub const CHASE_MIN: f32 = 0.8;
pub const CHASE_MAX: f32 = 3.0;

/// Contact-damage radius, sprite-grid units.
pub const CONTACT_RANGE: f32 = 1.0;

/// What one enemy does this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Decision {
    /// Horizontal step toward the player, already collision-approved.
    pub move_x: Option<Dir>,
    /// Vertical step toward the player, already collision-approved.
    pub move_y: Option<Dir>,
    /// True when the enemy is outside the chase band (or distance is
    /// degenerate): no movement, idle animation.
    pub hold: bool,
    /// True when the player takes contact damage this frame.
    pub contact: bool,
}

/// Decide one enemy's frame, given its position/speed and the player.
/// Pure: the caller applies the movement and damage.
pub fn decide(
    level: &Level,
    enemy_pos: Vec2,
    move_len: f32,
    player_pos: Vec2,
    player_alive: bool,
) -> Decision {
    let mut out = Decision::default();

    let dist = to_sprite_units(distance(player_pos, enemy_pos));
    if !dist.is_finite() || !move_len.is_finite() {
        out.hold = true;
        return out;
    }

    if (CHASE_MIN..CHASE_MAX).contains(&dist) {
        // Per-axis pursuit: strict comparisons, independent collision gates.
        if player_pos.x < enemy_pos.x {
            if level.can_move_left(enemy_pos.x, enemy_pos.y, move_len) {
                out.move_x = Some(Dir::Left);
            }
        } else if player_pos.x > enemy_pos.x {
            if level.can_move_right(enemy_pos.x, enemy_pos.y, move_len) {
                out.move_x = Some(Dir::Right);
            }
        }
        if player_pos.y > enemy_pos.y {
            if level.can_move_up(enemy_pos.x, enemy_pos.y, move_len) {
                out.move_y = Some(Dir::Up);
            }
        } else if player_pos.y < enemy_pos.y {
            if level.can_move_down(enemy_pos.x, enemy_pos.y, move_len) {
                out.move_y = Some(Dir::Down);
            }
        }
    } else {
        out.hold = true;
    }

    if dist < CONTACT_RANGE && player_alive {
        out.contact = true;
    }

    out
}
