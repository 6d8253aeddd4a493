// WorldGrid - the four stacked planes of the active sector
//
// All planes share one 192x192 buffer; plane `p` lives at offset `p * 48` on
// both axes. Only the diagonal blocks are ever written.

use serde::Serialize;

use crate::SECTOR_TILES;
use crate::sector::SectorTiles;
use crate::tile::Tile;

pub const PLANE_COUNT: usize = 4;
pub const GRID_SIZE: usize = SECTOR_TILES * PLANE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum Plane {
    Ground = 0,
    Upper1 = 1,
    Upper2 = 2,
    Underground = 3,
}

impl Plane {
    pub const ALL: [Plane; PLANE_COUNT] =
        [Plane::Ground, Plane::Upper1, Plane::Upper2, Plane::Underground];

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Plane::Ground),
            1 => Some(Plane::Upper1),
            2 => Some(Plane::Upper2),
            3 => Some(Plane::Underground),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Offset of this plane's block inside the shared grid
    pub fn grid_offset(self) -> usize {
        self as usize * SECTOR_TILES
    }

    /// Vertical offset the plane is drawn at
    pub fn base_height(self) -> f32 {
        match self {
            Plane::Ground => 0.0,
            Plane::Upper1 => -1.56,
            Plane::Upper2 => -3.12,
            Plane::Underground => 12.0,
        }
    }

    pub fn is_upper_floor(self) -> bool {
        matches!(self, Plane::Upper1 | Plane::Upper2)
    }
}

impl std::fmt::Display for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldGrid {
    tiles: Vec<Tile>,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldGrid {
    pub fn new() -> Self {
        WorldGrid {
            tiles: vec![Tile::default(); GRID_SIZE * GRID_SIZE],
        }
    }

    /// Tile at an absolute grid position
    pub fn get(&self, gx: usize, gz: usize) -> Option<&Tile> {
        if gx >= GRID_SIZE || gz >= GRID_SIZE {
            return None;
        }
        self.tiles.get(gx * GRID_SIZE + gz)
    }

    /// Tile `(x, z)` of one plane. Panics when `x` or `z` is not below 48.
    pub fn tile(&self, plane: Plane, x: usize, z: usize) -> &Tile {
        assert!(
            x < SECTOR_TILES && z < SECTOR_TILES,
            "tile ({x}, {z}) outside sector"
        );
        let offset = plane.grid_offset();
        &self.tiles[(x + offset) * GRID_SIZE + z + offset]
    }

    /// Copy a decoded sector into its plane's block
    pub fn set_plane(&mut self, plane: Plane, sector: &SectorTiles) {
        let offset = plane.grid_offset();
        for x in 0..SECTOR_TILES {
            for z in 0..SECTOR_TILES {
                self.tiles[(x + offset) * GRID_SIZE + z + offset] = *sector.tile(x, z);
            }
        }
    }

    /// Iterate one plane in file order (x outer, z inner)
    pub fn plane_tiles(&self, plane: Plane) -> impl Iterator<Item = (usize, usize, &Tile)> + '_ {
        (0..SECTOR_TILES).flat_map(move |x| {
            (0..SECTOR_TILES).map(move |z| (x, z, self.tile(plane, x, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_offsets() {
        assert_eq!(Plane::Ground.grid_offset(), 0);
        assert_eq!(Plane::Underground.grid_offset(), 144);
        assert_eq!(Plane::from_index(4), None);
    }

    #[test]
    fn test_set_plane_lands_on_diagonal_block() {
        let mut tiles = SectorTiles::empty();
        tiles.tile_mut(0, 0).color = 9;
        tiles.tile_mut(47, 47).color = 7;

        let mut grid = WorldGrid::new();
        grid.set_plane(Plane::Upper1, &tiles);

        assert_eq!(grid.get(48, 48).map(|t| t.color), Some(9));
        assert_eq!(grid.get(95, 95).map(|t| t.color), Some(7));
        assert_eq!(grid.tile(Plane::Upper1, 0, 0).color, 9);
        assert_eq!(grid.tile(Plane::Ground, 0, 0).color, 0);
        assert!(grid.get(GRID_SIZE, 0).is_none());
    }
}
