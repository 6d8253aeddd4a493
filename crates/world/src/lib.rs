// mapview-world - World data decoding and geometry derivation
//
// Decodes sector tile grids and mesh assets, maps world coordinates to
// sectors, and derives the per-vertex geometry a renderer draws from them.

pub mod address;
pub mod catalog;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod model;
pub mod palette;
pub mod placement;
pub mod sector;
pub mod textures;
pub mod tile;
pub mod view;

pub use address::{Direction, SectorAddress, coordinates_to_sector};
pub use catalog::ModelCatalog;
pub use error::WorldError;
pub use geometry::{GeometryParams, Layer, RenderOptions, TileGeometry, Vec3, VertexRole};
pub use grid::{Plane, WorldGrid};
pub use model::ModelDefinition;
pub use placement::{ModelInstance, OnscreenModels, Placement, PlacementTable};
pub use sector::{SectorStore, SectorTiles};
pub use tile::Tile;
pub use view::WorldView;

/// Tiles along one edge of a sector
pub const SECTOR_TILES: usize = 48;

/// Offset that centres a sector's tiles on the origin
pub const HALF_SECTOR: f32 = 24.0;
