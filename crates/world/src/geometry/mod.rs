// Tile geometry resolver
//
// Every tile has twelve vertex roles. Their horizontal position is the tile
// index (or the next index along x/z) shifted by half a sector; their height
// comes from the tile or a neighbour, optionally lifted by a wall.

pub mod crop;
pub mod primitives;

use serde::Serialize;

use crate::grid::{Plane, WorldGrid};
use crate::tile::WALL_HEIGHT;
use crate::{HALF_SECTOR, SECTOR_TILES};

pub use crop::CropStyle;
pub use primitives::{Polygon, Surface, TilePrimitives};

const LAST_TILE: usize = SECTOR_TILES - 1;

/// Raise applied to wireframe lines so they sit just off the surface
pub const WIREFRAME_OFFSET: f32 = 0.015;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Which tiles are drawn, whose heights they sit on, and at what level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layer {
    /// Plane the tile records (textures, walls, colours) come from
    pub tiles: Plane,
    /// Plane the elevations come from
    pub heights: Plane,
    /// Plane whose base height the layer is drawn at
    pub level: Plane,
}

impl Layer {
    /// A plane drawn as part of the ground view. Upper floors stand on the
    /// ground elevation; the underground keeps its own.
    pub fn ground_view(plane: Plane) -> Self {
        let heights = if plane == Plane::Underground {
            Plane::Underground
        } else {
            Plane::Ground
        };
        Layer {
            tiles: plane,
            heights,
            level: plane,
        }
    }

    /// A non-ground sector opened on its own, drawn at ground level
    pub fn standalone(plane: Plane) -> Self {
        Layer {
            tiles: plane,
            heights: plane,
            level: Plane::Ground,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeometryParams {
    /// User-adjustable vertical scale
    pub tile_scale: f32,
    /// Extra vertical offset, non-zero only while drawing wireframe lines
    pub edge_offset: f32,
}

impl Default for GeometryParams {
    fn default() -> Self {
        GeometryParams {
            tile_scale: 4.0,
            edge_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub tile_crop: bool,
    pub show_terrain: bool,
    pub underground: bool,
    pub multi_story: bool,
    pub show_walls: bool,
    pub wire_frame: bool,
    pub show_models: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            tile_crop: true,
            show_terrain: true,
            underground: true,
            multi_story: true,
            show_walls: true,
            wire_frame: true,
            show_models: true,
        }
    }
}

/// The twelve vertex roles of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum VertexRole {
    // terrain corners
    TerrainOrigin = 1,
    TerrainZ = 2,
    TerrainXZ = 3,
    TerrainX = 4,
    // wall tops
    WallTopOrigin = 5,
    WallTopZ = 6,
    WallTopXZ = 7,
    WallTopX = 8,
    // `\` diagonal wall corners
    DiagonalBaseX = 9,
    DiagonalBaseZ = 10,
    DiagonalTopZ = 11,
    DiagonalTopX = 12,
}

impl VertexRole {
    pub const ALL: [VertexRole; 12] = [
        VertexRole::TerrainOrigin,
        VertexRole::TerrainZ,
        VertexRole::TerrainXZ,
        VertexRole::TerrainX,
        VertexRole::WallTopOrigin,
        VertexRole::WallTopZ,
        VertexRole::WallTopXZ,
        VertexRole::WallTopX,
        VertexRole::DiagonalBaseX,
        VertexRole::DiagonalBaseZ,
        VertexRole::DiagonalTopZ,
        VertexRole::DiagonalTopX,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index).checked_sub(1)?).copied()
    }
}

/// Neighbour along +z; the last row reads its -x neighbour instead
fn toward_z(x: usize, z: usize) -> (usize, usize) {
    if z < LAST_TILE {
        (x, z + 1)
    } else {
        (x.saturating_sub(1), z)
    }
}

/// Neighbour along +x; the last column reads its -z neighbour instead
fn toward_x(x: usize, z: usize) -> (usize, usize) {
    if x < LAST_TILE {
        (x + 1, z)
    } else {
        (x, z.saturating_sub(1))
    }
}

/// Diagonal neighbour; on either edge the tile itself
fn toward_xz(x: usize, z: usize) -> (usize, usize) {
    if x < LAST_TILE && z < LAST_TILE {
        (x + 1, z + 1)
    } else {
        (x, z)
    }
}

/// Vertex positions for one world grid at one scale
#[derive(Debug, Clone, Copy)]
pub struct TileGeometry<'a> {
    grid: &'a WorldGrid,
    params: GeometryParams,
}

impl<'a> TileGeometry<'a> {
    pub fn new(grid: &'a WorldGrid, params: GeometryParams) -> Self {
        TileGeometry { grid, params }
    }

    pub fn grid(&self) -> &'a WorldGrid {
        self.grid
    }

    pub fn params(&self) -> GeometryParams {
        self.params
    }

    /// Same grid, different vertical offset
    pub fn with_edge_offset(&self, edge_offset: f32) -> Self {
        TileGeometry {
            grid: self.grid,
            params: GeometryParams {
                edge_offset,
                ..self.params
            },
        }
    }

    /// Vertical position of tile `(x, z)` of the layer's height plane
    pub fn height(&self, layer: Layer, (x, z): (usize, usize), wall: bool) -> f32 {
        let tile = self.grid.tile(layer.heights, x, z);
        let lift = if wall { WALL_HEIGHT } else { 0 };
        let elevation = f32::from(u16::from(tile.height) + lift);
        layer.level.base_height() - elevation / 255.0 * self.params.tile_scale
            + self.params.edge_offset
    }

    /// Position of one vertex role of tile `(x, z)`. `None` for a tile
    /// outside the sector and for the far diagonal wall corner on the last
    /// row or column.
    pub fn vertex(&self, layer: Layer, x: usize, z: usize, role: VertexRole) -> Option<Vec3> {
        if x >= SECTOR_TILES || z >= SECTOR_TILES {
            return None;
        }

        let near = (x, z);
        let (dx, dz, y) = match role {
            VertexRole::TerrainOrigin => (0, 0, self.height(layer, near, false)),
            VertexRole::TerrainZ => (0, 1, self.height(layer, toward_z(x, z), false)),
            VertexRole::TerrainXZ => (1, 1, self.height(layer, toward_xz(x, z), false)),
            VertexRole::TerrainX => (1, 0, self.height(layer, toward_x(x, z), false)),
            VertexRole::WallTopOrigin => (0, 0, self.height(layer, near, true)),
            VertexRole::WallTopZ => (0, 1, self.height(layer, toward_z(x, z), true)),
            VertexRole::WallTopXZ => {
                if x >= LAST_TILE || z >= LAST_TILE {
                    return None;
                }
                (1, 1, self.height(layer, (x, z + 1), true))
            }
            VertexRole::WallTopX => (1, 0, self.height(layer, toward_x(x, z), true)),
            VertexRole::DiagonalBaseX => (1, 0, self.height(layer, toward_x(x, z), false)),
            VertexRole::DiagonalBaseZ => (0, 1, self.height(layer, toward_xz(x, z), false)),
            VertexRole::DiagonalTopZ => (0, 1, self.height(layer, toward_z(x, z), true)),
            VertexRole::DiagonalTopX => (1, 0, self.height(layer, toward_x(x, z), true)),
        };

        Some(Vec3::new(
            (x + dx) as f32 - HALF_SECTOR,
            y,
            (z + dz) as f32 - HALF_SECTOR,
        ))
    }
}
