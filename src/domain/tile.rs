/// Terrain tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Grass,
    Path,
    Water, // impassable
    Rock,  // impassable
    Tree,  // impassable
}

impl Tile {
    /// Can an entity's bounding box overlap this tile?
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Grass | Tile::Path)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Grass
    }
}
