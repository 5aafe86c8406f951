/// Level: static terrain grid + world bounds, queried as a collision map.
///
/// The grid is immutable after parse. Rows are stored top-down (row 0 is the
/// top of the map) while world Y grows upward, so `tile_at_world` flips the
/// row index.
///
/// ## Collision contract
///
/// `can_move(dir, x, y, dist)` answers: may an entity whose bounding box is
/// anchored at world position (x, y) translate by `dist` world units in
/// `dir` without leaving the world bounds or overlapping an impassable
/// tile? The FULL movement vector is checked (sampled in half-cell steps),
/// not just the endpoint. Zero distance is always allowed. Pure predicate,
/// never fails.
///
/// ## Map legend
///   '.' = Grass    ':' = Path     '~' = Water
///   '^' = Rock     'T' = Tree
///   'P' = Player spawn   'S' = Skeleton spawn   'M' = Monster spawn
///   (spawn cells read as Grass)

use super::entity::Dir;
use super::tile::Tile;
use super::units::{Vec2, SPRITE_SIZE_WORLD_UNIT};

/// Sampling stride along the movement vector.
const SWEEP_STEP: f32 = SPRITE_SIZE_WORLD_UNIT / 2.0;

/// Corner inset so a box flush against a cell edge does not read the
/// neighboring cell.
const CORNER_INSET: f32 = 0.01;

pub struct Level {
    tiles: Vec<Vec<Tile>>,
    cols: usize,
    rows: usize,
}

/// Spawn points collected while parsing a map.
pub struct SpawnSet {
    pub player: Vec2,
    pub skeletons: Vec<Vec2>,
    pub monsters: Vec<Vec2>,
}

impl Level {
    /// Parse a map from ASCII rows. Spawn markers are collected into the
    /// returned `SpawnSet`; their cells become Grass.
    pub fn parse(rows: &[&str]) -> (Level, SpawnSet) {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut tiles = vec![vec![Tile::Grass; width]; height];
        let mut spawns = SpawnSet {
            player: Vec2::new(0.0, 0.0),
            skeletons: vec![],
            monsters: vec![],
        };

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let world = cell_origin(x, y, height);
                match ch {
                    ':' => tiles[y][x] = Tile::Path,
                    '~' => tiles[y][x] = Tile::Water,
                    '^' => tiles[y][x] = Tile::Rock,
                    'T' => tiles[y][x] = Tile::Tree,
                    'P' => spawns.player = world,
                    'S' => spawns.skeletons.push(world),
                    'M' => spawns.monsters.push(world),
                    _ => {}
                }
            }
        }

        (Level { tiles, cols: width, rows: height }, spawns)
    }

    /// The built-in glade map.
    pub fn default_map() -> (Level, SpawnSet) {
        Level::parse(&[
            "TTTTTTTTTTTTTTTTTTTTTTTT",
            "T......^^......~~~.....T",
            "T..S...........~~~..M..T",
            "T......::::::..~~~.....T",
            "T......:....:..........T",
            "T..T...:....:....^.....T",
            "T......:.P..:..........T",
            "T~~....:....:......T...T",
            "T~~....::::::..........T",
            "T~~............^^..S...T",
            "T......T..............TT",
            "T.....................TT",
            "T...^....M......~~....TT",
            "T...............~~.....T",
            "T......................T",
            "TTTTTTTTTTTTTTTTTTTTTTTT",
        ])
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// World bounds, in world units.
    pub fn width_world(&self) -> f32 {
        self.cols as f32 * SPRITE_SIZE_WORLD_UNIT
    }

    pub fn height_world(&self) -> f32 {
        self.rows as f32 * SPRITE_SIZE_WORLD_UNIT
    }

    /// Tile under a world-space point. Out of bounds reads as Rock.
    pub fn tile_at_world(&self, wx: f32, wy: f32) -> Tile {
        if wx < 0.0 || wy < 0.0 {
            return Tile::Rock;
        }
        let col = (wx / SPRITE_SIZE_WORLD_UNIT) as usize;
        let row_up = (wy / SPRITE_SIZE_WORLD_UNIT) as usize;
        if col >= self.cols || row_up >= self.rows {
            return Tile::Rock;
        }
        self.tiles[self.rows - 1 - row_up][col]
    }

    /// Tile by grid index (row 0 = top). Used by the renderer.
    pub fn tile_at_grid(&self, col: usize, row: usize) -> Tile {
        if col < self.cols && row < self.rows {
            self.tiles[row][col]
        } else {
            Tile::Rock
        }
    }

    // ── Collision predicates ──

    pub fn can_move(&self, dir: Dir, x: f32, y: f32, dist: f32) -> bool {
        if dist <= 0.0 {
            return true;
        }
        let (dx, dy) = dir.unit();
        let mut travelled = 0.0;
        loop {
            travelled = (travelled + SWEEP_STEP).min(dist);
            if !self.box_free(x + dx * travelled, y + dy * travelled) {
                return false;
            }
            if travelled >= dist {
                return true;
            }
        }
    }

    pub fn can_move_left(&self, x: f32, y: f32, dist: f32) -> bool {
        self.can_move(Dir::Left, x, y, dist)
    }

    pub fn can_move_right(&self, x: f32, y: f32, dist: f32) -> bool {
        self.can_move(Dir::Right, x, y, dist)
    }

    pub fn can_move_up(&self, x: f32, y: f32, dist: f32) -> bool {
        self.can_move(Dir::Up, x, y, dist)
    }

    pub fn can_move_down(&self, x: f32, y: f32, dist: f32) -> bool {
        self.can_move(Dir::Down, x, y, dist)
    }

    /// Is a one-cell bounding box anchored at (x, y) fully inside the world
    /// and clear of impassable tiles?
    fn box_free(&self, x: f32, y: f32) -> bool {
        let size = SPRITE_SIZE_WORLD_UNIT;
        if x < 0.0 || y < 0.0 {
            return false;
        }
        if x + size > self.width_world() || y + size > self.height_world() {
            return false;
        }
        let lo = CORNER_INSET;
        let hi = size - CORNER_INSET;
        for &(cx, cy) in &[(lo, lo), (hi, lo), (lo, hi), (hi, hi)] {
            if !self.tile_at_world(x + cx, y + cy).is_passable() {
                return false;
            }
        }
        true
    }
}

/// World-space origin (bottom-left corner of the cell's box) for a grid cell.
fn cell_origin(col: usize, row_top_down: usize, total_rows: usize) -> Vec2 {
    Vec2::new(
        col as f32 * SPRITE_SIZE_WORLD_UNIT,
        (total_rows - 1 - row_top_down) as f32 * SPRITE_SIZE_WORLD_UNIT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_field() -> Level {
        // 5x5 of grass ringed by trees
        Level::parse(&[
            "TTTTTTT",
            "T.....T",
            "T.....T",
            "T.....T",
            "T.....T",
            "T.....T",
            "TTTTTTT",
        ])
        .0
    }

    fn center() -> Vec2 {
        Vec2::new(3.0 * SPRITE_SIZE_WORLD_UNIT, 3.0 * SPRITE_SIZE_WORLD_UNIT)
    }

    #[test]
    fn zero_distance_always_allowed() {
        let level = open_field();
        let c = center();
        assert!(level.can_move_left(c.x, c.y, 0.0));
        assert!(level.can_move_up(c.x, c.y, 0.0));
    }

    #[test]
    fn open_ground_is_walkable() {
        let level = open_field();
        let c = center();
        let d = SPRITE_SIZE_WORLD_UNIT;
        assert!(level.can_move_left(c.x, c.y, d));
        assert!(level.can_move_right(c.x, c.y, d));
        assert!(level.can_move_up(c.x, c.y, d));
        assert!(level.can_move_down(c.x, c.y, d));
    }

    #[test]
    fn tree_ring_blocks_movement() {
        let level = open_field();
        // Standing in the corner cell (1,1 from bottom-left)
        let x = SPRITE_SIZE_WORLD_UNIT;
        let y = SPRITE_SIZE_WORLD_UNIT;
        assert!(!level.can_move_left(x, y, SPRITE_SIZE_WORLD_UNIT));
        assert!(!level.can_move_down(x, y, SPRITE_SIZE_WORLD_UNIT));
        assert!(level.can_move_right(x, y, SPRITE_SIZE_WORLD_UNIT));
        assert!(level.can_move_up(x, y, SPRITE_SIZE_WORLD_UNIT));
    }

    #[test]
    fn full_vector_is_checked_not_just_endpoint() {
        // Grass, a single rock, then grass again: a long hop over the rock
        // must be denied even though the endpoint is clear.
        let (level, _) = Level::parse(&[
            ".....",
            "..^..",
            ".....",
        ]);
        let y = SPRITE_SIZE_WORLD_UNIT; // middle row
        assert!(!level.can_move_right(0.0, y, 4.0 * SPRITE_SIZE_WORLD_UNIT));
    }

    #[test]
    fn world_bounds_deny_movement() {
        let (level, _) = Level::parse(&["...", "...", "..."]);
        assert!(!level.can_move_left(0.0, 0.0, 1.0));
        assert!(!level.can_move_down(0.0, 0.0, 1.0));
        let far = level.width_world() - SPRITE_SIZE_WORLD_UNIT;
        assert!(!level.can_move_right(far, 0.0, 1.0));
    }

    #[test]
    fn partial_step_inside_open_cell_is_allowed() {
        let level = open_field();
        let c = center();
        assert!(level.can_move_right(c.x, c.y, 3.5));
    }

    #[test]
    fn spawn_markers_collected_and_walkable() {
        let (level, spawns) = Level::parse(&[
            "TTTTT",
            "TP.ST",
            "T..MT",
            "TTTTT",
        ]);
        assert_eq!(spawns.skeletons.len(), 1);
        assert_eq!(spawns.monsters.len(), 1);
        assert!(level
            .tile_at_world(spawns.player.x + 1.0, spawns.player.y + 1.0)
            .is_passable());
    }

    #[test]
    fn out_of_bounds_reads_as_rock() {
        let level = open_field();
        assert_eq!(level.tile_at_world(-1.0, 0.0), Tile::Rock);
        assert_eq!(level.tile_at_world(0.0, 10_000.0), Tile::Rock);
    }
}
