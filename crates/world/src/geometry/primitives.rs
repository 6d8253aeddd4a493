// Per-tile primitive assembly: which polygons a renderer draws for a tile,
// built from the resolver's vertex roles.

use serde::Serialize;

use super::crop::{CropStyle, select_crop};
use super::{Layer, RenderOptions, TileGeometry, Vec3, VertexRole, WIREFRAME_OFFSET};
use crate::SECTOR_TILES;
use crate::grid::Plane;
use crate::palette::ground_color;
use crate::tile::DiagonalWall;

use VertexRole::{
    DiagonalBaseX, DiagonalBaseZ, DiagonalTopX, DiagonalTopZ, TerrainOrigin, TerrainX, TerrainXZ,
    TerrainZ, WallTopOrigin, WallTopX, WallTopXZ, WallTopZ,
};

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
const TRIANGLE_UVS: [[f32; 2]; 3] = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

const EAST_WALL: [VertexRole; 4] = [TerrainOrigin, TerrainZ, WallTopZ, WallTopOrigin];
const NORTH_WALL: [VertexRole; 4] = [TerrainOrigin, TerrainX, WallTopX, WallTopOrigin];
const FORWARD_DIAGONAL: [VertexRole; 4] = [TerrainOrigin, TerrainXZ, WallTopXZ, WallTopOrigin];
const BACKWARD_DIAGONAL: [VertexRole; 4] = [DiagonalBaseX, DiagonalBaseZ, DiagonalTopZ, DiagonalTopX];
const GROUND_QUAD: [VertexRole; 4] = [TerrainOrigin, TerrainZ, TerrainXZ, TerrainX];

const WIRE_SEGMENTS: [(VertexRole, VertexRole); 4] = [
    (TerrainOrigin, TerrainZ),
    (TerrainXZ, TerrainX),
    (TerrainOrigin, TerrainX),
    (TerrainZ, TerrainXZ),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Surface {
    GroundTexture(u8),
    WallTexture(u16),
    /// Flat RGB in `0.0..=1.0`
    Color([f32; 3]),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub surface: Surface,
    pub vertices: Vec<Vec3>,
    /// One per vertex for textured surfaces, empty for flat colour
    pub uvs: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TilePrimitives {
    pub walls: Vec<Polygon>,
    pub terrain: Vec<Polygon>,
    pub wireframe: Vec<[Vec3; 2]>,
}

impl TilePrimitives {
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.terrain.is_empty() && self.wireframe.is_empty()
    }
}

/// Texture triangle roles and flat overlay roles of a crop style
fn crop_triangles(style: CropStyle) -> Option<([VertexRole; 3], [VertexRole; 3])> {
    match style {
        CropStyle::TopRight => Some((
            [TerrainZ, TerrainXZ, TerrainX],
            [TerrainZ, TerrainOrigin, TerrainX],
        )),
        CropStyle::TopLeft => Some((
            [TerrainOrigin, TerrainZ, TerrainXZ],
            [TerrainOrigin, TerrainXZ, TerrainX],
        )),
        CropStyle::BottomRight => Some((
            [TerrainOrigin, TerrainXZ, TerrainX],
            [TerrainOrigin, TerrainZ, TerrainXZ],
        )),
        CropStyle::BottomLeft => Some((
            [TerrainZ, TerrainOrigin, TerrainX],
            [TerrainZ, TerrainXZ, TerrainX],
        )),
        CropStyle::None => None,
    }
}

struct TileBuilder<'g, 'a> {
    geometry: &'g TileGeometry<'a>,
    layer: Layer,
    x: usize,
    z: usize,
}

impl TileBuilder<'_, '_> {
    /// Polygon over `roles`; roles without a position are dropped with their uv
    fn polygon(&self, roles: &[VertexRole], surface: Surface, uvs: &[[f32; 2]]) -> Polygon {
        let mut polygon = Polygon {
            surface,
            vertices: Vec::with_capacity(roles.len()),
            uvs: Vec::with_capacity(uvs.len()),
        };
        for (i, &role) in roles.iter().enumerate() {
            let Some(vertex) = self.geometry.vertex(self.layer, self.x, self.z, role) else {
                continue;
            };
            polygon.vertices.push(vertex);
            if let Some(uv) = uvs.get(i) {
                polygon.uvs.push(*uv);
            }
        }
        polygon
    }

    fn wireframe(&self, out: &mut Vec<[Vec3; 2]>) {
        // once just above the surface, once just below
        for offset in [-WIREFRAME_OFFSET, WIREFRAME_OFFSET] {
            let lifted = self.geometry.with_edge_offset(offset);
            for (a, b) in WIRE_SEGMENTS {
                let a = lifted.vertex(self.layer, self.x, self.z, a);
                let b = lifted.vertex(self.layer, self.x, self.z, b);
                if let (Some(a), Some(b)) = (a, b) {
                    out.push([a, b]);
                }
            }
        }
    }
}

/// Everything drawn for tile `(x, z)` of `layer`; nothing outside the sector
pub fn build_tile(
    geometry: &TileGeometry<'_>,
    layer: Layer,
    x: usize,
    z: usize,
    options: &RenderOptions,
) -> TilePrimitives {
    if x >= SECTOR_TILES || z >= SECTOR_TILES {
        return TilePrimitives::default();
    }
    let tile = *geometry.grid().tile(layer.tiles, x, z);
    let builder = TileBuilder {
        geometry,
        layer,
        x,
        z,
    };
    let mut out = TilePrimitives::default();

    // invisible walls suppress every wall on the tile
    if options.show_walls && !tile.has_invisible_wall() {
        if tile.wall_east != 0 {
            let surface = Surface::WallTexture(u16::from(tile.wall_east));
            out.walls.push(builder.polygon(&EAST_WALL, surface, &QUAD_UVS));
        }
        if tile.wall_north != 0 {
            let surface = Surface::WallTexture(u16::from(tile.wall_north));
            out.walls.push(builder.polygon(&NORTH_WALL, surface, &QUAD_UVS));
        }
        match tile.diagonal_wall() {
            Some(DiagonalWall::Forward(texture)) => {
                let surface = Surface::WallTexture(texture);
                out.walls.push(builder.polygon(&FORWARD_DIAGONAL, surface, &QUAD_UVS));
            }
            Some(DiagonalWall::Backward(texture)) => {
                let surface = Surface::WallTexture(texture);
                out.walls.push(builder.polygon(&BACKWARD_DIAGONAL, surface, &QUAD_UVS));
            }
            None => {}
        }
    }

    if !options.show_terrain {
        return out;
    }

    let flat = Surface::Color(ground_color(tile.color));
    if tile.is_textured() {
        if tile.is_void() {
            return out;
        }
        let texture = Surface::GroundTexture(tile.texture);
        let style = select_crop(geometry.grid(), layer.tiles, x, z, options.tile_crop);
        match crop_triangles(style) {
            Some((textured, overlay)) => {
                out.terrain.push(builder.polygon(&textured, texture, &TRIANGLE_UVS));
                if !layer.level.is_upper_floor() {
                    out.terrain.push(builder.polygon(&overlay, flat, &[]));
                }
            }
            None => out.terrain.push(builder.polygon(&GROUND_QUAD, texture, &QUAD_UVS)),
        }
    } else {
        // bare upper-floor tiles are open air
        if layer.level.is_upper_floor() {
            return out;
        }
        out.terrain.push(builder.polygon(&GROUND_QUAD, flat, &[]));
    }

    if options.wire_frame && matches!(layer.level, Plane::Ground | Plane::Underground) {
        builder.wireframe(&mut out.wireframe);
    }

    out
}
