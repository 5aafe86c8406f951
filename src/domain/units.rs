/// World-unit / sprite-grid-unit conversions.
///
/// Two coordinate systems:
///   - **World units** — the simulation coordinates. Entity positions and
///     move distances are world-unit floats.
///   - **Sprite-grid units** — one unit per sprite-sheet cell. AI ranges
///     (chase band, contact range, attack reach) are specified in these.
///
/// The renderer owns the third system (terminal cells) and never leaks it
/// into the domain.

/// Side length of one sprite cell, in world units.
pub const SPRITE_SIZE_WORLD_UNIT: f32 = 16.0;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

/// Euclidean distance between two world positions, in world units.
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Convert a world-unit length to sprite-grid units.
#[inline]
pub fn to_sprite_units(world: f32) -> f32 {
    world / SPRITE_SIZE_WORLD_UNIT
}

/// Convert a sprite-grid length to world units.
#[inline]
pub fn to_world_units(sprites: f32) -> f32 {
    sprites * SPRITE_SIZE_WORLD_UNIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-6);
        assert!((distance(b, a) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn distance_of_coincident_points_is_zero() {
        let p = Vec2::new(7.5, -2.25);
        assert_eq!(distance(p, p), 0.0);
    }

    #[test]
    fn sprite_unit_conversion() {
        assert_eq!(to_sprite_units(SPRITE_SIZE_WORLD_UNIT), 1.0);
        assert_eq!(to_world_units(2.5), 2.5 * SPRITE_SIZE_WORLD_UNIT);
    }
}
