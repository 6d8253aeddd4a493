// Sector store - fixed-size tile grid files, one per (plane, x, y)
//
// A sector file is 48x48 ten-byte records, x outer and z inner:
//   height(1) color(1) texture(1) roof(1) wall_east(1) wall_north(1) wall_diag(4, BE)

use std::path::{Path, PathBuf};

use mapview_shared::ByteBuffer;
use thiserror::Error;

use crate::SECTOR_TILES;
use crate::address::SectorAddress;
use crate::grid::Plane;
use crate::tile::Tile;

pub const TILE_RECORD_SIZE: usize = 10;
pub const SECTOR_FILE_SIZE: usize = SECTOR_TILES * SECTOR_TILES * TILE_RECORD_SIZE;

const SECTORS_DIR: &str = "sectors";

#[derive(Debug, Error)]
pub enum SectorError {
    #[error("sector data is {actual} bytes, expected {SECTOR_FILE_SIZE}")]
    WrongSize { actual: usize },

    #[error("truncated sector record: {0}")]
    Truncated(#[from] std::io::Error),

    #[error("cannot open file: {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid sector file {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: Box<SectorError>,
    },
}

/// One decoded 48x48 sector, independent of where it lands in the world grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorTiles {
    tiles: Vec<Tile>,
}

impl SectorTiles {
    pub fn empty() -> Self {
        SectorTiles {
            tiles: vec![Tile::default(); SECTOR_TILES * SECTOR_TILES],
        }
    }

    /// Decode a whole sector file. The height byte is dropped on the
    /// underground plane, which is always drawn flat.
    pub fn from_bytes(bytes: &[u8], plane: Plane) -> Result<Self, SectorError> {
        if bytes.len() != SECTOR_FILE_SIZE {
            return Err(SectorError::WrongSize {
                actual: bytes.len(),
            });
        }

        let mut buf = ByteBuffer::from(bytes);
        let mut tiles = Vec::with_capacity(SECTOR_TILES * SECTOR_TILES);
        for _ in 0..SECTOR_TILES * SECTOR_TILES {
            let height = buf.read_u8()?;
            let color = buf.read_u8()?;
            let texture = buf.read_u8()?;
            let roof = buf.read_u8()?;
            let wall_east = buf.read_u8()?;
            let wall_north = buf.read_u8()?;
            // stored as 32 bits, only the low half carries a value
            let wall_diag = (buf.read_u32()? & 0xFFFF) as u16;

            tiles.push(Tile {
                height: if plane == Plane::Underground { 0 } else { height },
                color,
                texture,
                roof,
                wall_east,
                wall_north,
                wall_diag,
            });
        }

        Ok(SectorTiles { tiles })
    }

    pub fn tile(&self, x: usize, z: usize) -> &Tile {
        &self.tiles[x * SECTOR_TILES + z]
    }

    pub fn tile_mut(&mut self, x: usize, z: usize) -> &mut Tile {
        &mut self.tiles[x * SECTOR_TILES + z]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

/// Reads sector files from `<data_dir>/sectors/`
#[derive(Debug, Clone)]
pub struct SectorStore {
    root: PathBuf,
}

impl SectorStore {
    pub fn new(data_dir: &Path) -> Self {
        SectorStore {
            root: data_dir.join(SECTORS_DIR),
        }
    }

    /// File name of one plane of a sector, e.g. `h0x55y48`
    pub fn file_name(plane: Plane, x: u16, y: u16) -> String {
        format!("h{}x{}y{}", plane.index(), x, y)
    }

    pub fn sector_path(&self, plane: Plane, x: u16, y: u16) -> PathBuf {
        self.root.join(Self::file_name(plane, x, y))
    }

    /// Load `plane` of the sector at `address`'s x/y
    pub fn load(&self, plane: Plane, address: &SectorAddress) -> Result<SectorTiles, SectorError> {
        let path = self.sector_path(plane, address.x, address.y);
        tracing::debug!("Loading sector file {}", path.display());

        let bytes = std::fs::read(&path).map_err(|source| SectorError::Read {
            path: path.clone(),
            source,
        })?;

        SectorTiles::from_bytes(&bytes, plane).map_err(|err| SectorError::Invalid {
            path,
            source: Box::new(err),
        })
    }
}
