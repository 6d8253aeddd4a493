// Crop style selection: textured tiles bordering untextured ones are drawn
// as a texture triangle plus a flat-colour triangle instead of a full quad.

use serde::Serialize;

use crate::SECTOR_TILES;
use crate::grid::{Plane, WorldGrid};

pub const NEIGHBOR_NORTH: u8 = 0b1000; // z - 1
pub const NEIGHBOR_SOUTH: u8 = 0b0100; // z + 1
pub const NEIGHBOR_EAST: u8 = 0b0010; // x - 1
pub const NEIGHBOR_WEST: u8 = 0b0001; // x + 1

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CropStyle {
    None,
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl CropStyle {
    /// Style for a neighbour mask; masks without an entry draw the full quad
    pub fn from_mask(mask: u8) -> Self {
        match mask & 0b1111 {
            0b0000 | 0b0001 | 0b0100 | 0b0101 => CropStyle::TopRight,
            0b0110 => CropStyle::TopLeft,
            0b1001 => CropStyle::BottomRight,
            0b0010 | 0b1000 | 0b1010 => CropStyle::BottomLeft,
            _ => CropStyle::None,
        }
    }
}

/// One bit per cardinal neighbour that also carries a ground texture.
/// Neighbours outside the sector count as untextured.
pub fn neighbor_mask(grid: &WorldGrid, plane: Plane, x: usize, z: usize) -> u8 {
    let textured = |x: usize, z: usize| grid.tile(plane, x, z).is_textured();
    let mut mask = 0;
    if z > 0 && textured(x, z - 1) {
        mask |= NEIGHBOR_NORTH;
    }
    if z + 1 < SECTOR_TILES && textured(x, z + 1) {
        mask |= NEIGHBOR_SOUTH;
    }
    if x > 0 && textured(x - 1, z) {
        mask |= NEIGHBOR_EAST;
    }
    if x + 1 < SECTOR_TILES && textured(x + 1, z) {
        mask |= NEIGHBOR_WEST;
    }
    mask
}

/// Crop style of tile `(x, z)` on `plane`
pub fn select_crop(grid: &WorldGrid, plane: Plane, x: usize, z: usize, enabled: bool) -> CropStyle {
    if !enabled || !grid.tile(plane, x, z).is_textured() {
        return CropStyle::None;
    }
    CropStyle::from_mask(neighbor_mask(grid, plane, x, z))
}
