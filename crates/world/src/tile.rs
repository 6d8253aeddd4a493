// Tile - one cell of a sector grid

use serde::Serialize;

/// Height added to a tile's elevation at the top of a wall
pub const WALL_HEIGHT: u16 = 100;

/// `wall_diag` values below this run one way, values between this and twice
/// this run the other way
pub const DIAG_WALL_OFFSET: u16 = 12000;

/// Wall texture that hides every wall on the tile
pub const INVISIBLE_WALL: u16 = 17;

/// Ground texture drawn as nothing (stairs, ladders, holes into the underground)
pub const VOID_TEXTURE: u8 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub height: u8,
    pub color: u8,
    pub texture: u8,
    pub roof: u8,
    pub wall_east: u8,
    pub wall_north: u8,
    pub wall_diag: u16,
}

/// The one diagonal wall a tile can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagonalWall {
    /// Runs from the tile origin to the far corner (`/`)
    Forward(u16),
    /// Runs across the other two corners (`\`)
    Backward(u16),
}

impl Tile {
    pub fn is_textured(&self) -> bool {
        self.texture != 0
    }

    pub fn is_void(&self) -> bool {
        self.texture == VOID_TEXTURE
    }

    /// True when any wall slot holds the invisible-wall texture
    pub fn has_invisible_wall(&self) -> bool {
        u16::from(self.wall_east) == INVISIBLE_WALL
            || u16::from(self.wall_north) == INVISIBLE_WALL
            || self.wall_diag == INVISIBLE_WALL
    }

    /// Decode `wall_diag`. Exactly `DIAG_WALL_OFFSET` and anything from twice
    /// the offset up select no wall.
    pub fn diagonal_wall(&self) -> Option<DiagonalWall> {
        let diag = self.wall_diag;
        if diag != 0 && diag < DIAG_WALL_OFFSET {
            Some(DiagonalWall::Forward(diag))
        } else if diag > DIAG_WALL_OFFSET && diag < DIAG_WALL_OFFSET * 2 {
            Some(DiagonalWall::Backward(diag % DIAG_WALL_OFFSET))
        } else {
            None
        }
    }
}
