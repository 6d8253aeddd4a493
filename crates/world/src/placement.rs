// Model placement - the placement table and the per-sector instance grid
//
// Table rows: x,y,dir,width,height,model_id,model_name
// Row order decides which instance wins when two land on the same tile.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::address::{SectorAddress, coordinates_to_sector};
use crate::catalog::{CatalogError, ModelCatalog};
use crate::geometry::Vec3;
use crate::model::ModelDefinition;
use crate::{HALF_SECTOR, SECTOR_TILES};

pub const PLACEMENT_FILE: &str = "model_locs.csv";

/// Model units per world unit
pub const MODEL_DEF_SCALE: f32 = 140.0;

const FIELD_COUNT: usize = 7;

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("cannot open file: {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("placement table line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One row of the placement table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub x: u16,
    pub y: u16,
    /// 0..=7 in 45 degree steps
    pub dir: u8,
    pub width: u8,
    pub height: u8,
    pub model_id: u16,
    pub name: String,
}

fn field<T: std::str::FromStr>(value: &str, name: &str, line: usize) -> Result<T, PlacementError> {
    value.trim().parse().map_err(|_| PlacementError::Malformed {
        line,
        reason: format!("bad {name} '{}'", value.trim()),
    })
}

impl Placement {
    /// Parse one row; `line` is 1-based and only used in errors
    pub fn parse(row: &str, line: usize) -> Result<Self, PlacementError> {
        let fields: Vec<&str> = row.splitn(FIELD_COUNT, ',').collect();
        if fields.len() != FIELD_COUNT {
            return Err(PlacementError::Malformed {
                line,
                reason: format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
            });
        }

        let name = fields[6].trim_end_matches(['\r', '\n']).trim();
        if name.is_empty() {
            return Err(PlacementError::Malformed {
                line,
                reason: "empty model name".to_string(),
            });
        }

        Ok(Placement {
            x: field(fields[0], "x", line)?,
            y: field(fields[1], "y", line)?,
            dir: field(fields[2], "dir", line)?,
            width: field(fields[3], "width", line)?,
            height: field(fields[4], "height", line)?,
            model_id: field(fields[5], "model id", line)?,
            name: name.to_string(),
        })
    }

    pub fn sector(&self) -> SectorAddress {
        coordinates_to_sector(self.x, self.y)
    }

    /// Slot in the instance grid. Uses the raw world y, not the band-reduced one.
    pub fn slot(&self) -> (usize, usize) {
        (
            usize::from(self.x) % SECTOR_TILES,
            usize::from(self.y) % SECTOR_TILES,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacementTable {
    records: Vec<Placement>,
}

impl PlacementTable {
    pub fn parse(text: &str) -> Result<Self, PlacementError> {
        let mut records = Vec::new();
        for (i, row) in text.lines().enumerate() {
            if row.trim().is_empty() {
                continue;
            }
            records.push(Placement::parse(row, i + 1)?);
        }
        Ok(PlacementTable { records })
    }

    /// Read `<data_dir>/model_locs.csv`
    pub fn load(data_dir: &Path) -> Result<Self, PlacementError> {
        let path = data_dir.join(PLACEMENT_FILE);
        tracing::info!("Loading placement table {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|source| PlacementError::Read {
            path: path.clone(),
            source,
        })?;
        let table = Self::parse(&text)?;
        tracing::debug!("{} placements", table.len());
        Ok(table)
    }

    pub fn records(&self) -> &[Placement] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decode every model the table references, each id once
    pub fn load_models(&self, catalog: &mut ModelCatalog) -> Result<(), CatalogError> {
        for record in &self.records {
            catalog.load(record.model_id, &record.name)?;
        }
        tracing::info!("Loaded {} distinct models", catalog.len());
        Ok(())
    }
}

/// Where and how one instance is drawn. Applied to a model vertex as
/// rotate about Y, then scale, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub rotation_degrees: f32,
    pub scale: f32,
}

impl ModelTransform {
    /// World position of a model-space vertex. Model y is up and model z
    /// points away from the viewer, hence `(x, y, -z)`.
    pub fn apply(&self, [vx, vy, vz]: [i16; 3]) -> Vec3 {
        let (x, y, z) = (f32::from(vx), f32::from(vy), -f32::from(vz));
        let (sin, cos) = self.rotation_degrees.to_radians().sin_cos();
        let rx = x * cos + z * sin;
        let rz = -x * sin + z * cos;
        Vec3::new(
            self.translation.x + rx * self.scale,
            self.translation.y + y * self.scale,
            self.translation.z + rz * self.scale,
        )
    }
}

/// A model placed on one tile of the active sector
#[derive(Debug, Clone, Serialize)]
pub struct ModelInstance {
    #[serde(skip)]
    pub model: Arc<ModelDefinition>,
    pub model_id: u16,
    pub dir: u8,
    pub width: u8,
    pub height: u8,
    pub tile_x: usize,
    pub tile_z: usize,
}

impl ModelInstance {
    pub fn rotation_degrees(&self) -> f32 {
        if self.dir > 7 {
            0.0
        } else {
            f32::from(self.dir) * 45.0
        }
    }

    /// Placement for `tile_scale` on a tile of elevation `ground_height`
    pub fn transform(&self, tile_scale: f32, ground_height: u8) -> ModelTransform {
        let factor = tile_scale / 7.0;
        let width = f32::from(self.width) * factor - factor;
        let height = f32::from(self.height) * factor - factor;
        let (mut x_off, mut z_off) = (factor, factor);
        // diagonal directions get no footprint shift
        match self.dir {
            2 | 6 => {
                z_off += width;
                x_off += height;
            }
            0 | 4 => {
                x_off += width;
                z_off += height;
            }
            _ => {}
        }

        ModelTransform {
            translation: Vec3::new(
                self.tile_x as f32 - HALF_SECTOR + x_off,
                -(f32::from(ground_height) / 255.0 * tile_scale),
                self.tile_z as f32 - HALF_SECTOR + z_off,
            ),
            rotation_degrees: self.rotation_degrees(),
            scale: 1.0 / MODEL_DEF_SCALE,
        }
    }

    /// World positions of one face's vertices
    pub fn face_positions(&self, transform: &ModelTransform, face: usize) -> Vec<Vec3> {
        self.model
            .face_vertices
            .get(face)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.model.vertex(usize::from(index)))
            .map(|vertex| transform.apply(vertex))
            .collect()
    }
}

/// Instances on the active sector, at most one per tile
#[derive(Debug, Clone)]
pub struct OnscreenModels {
    slots: Vec<Option<ModelInstance>>,
    placed: usize,
}

impl Default for OnscreenModels {
    fn default() -> Self {
        OnscreenModels {
            slots: vec![None; SECTOR_TILES * SECTOR_TILES],
            placed: 0,
        }
    }
}

impl OnscreenModels {
    /// Rescan the whole table for placements inside `address`. A later
    /// placement on an occupied tile replaces the earlier one.
    pub fn build(
        address: &SectorAddress,
        table: &PlacementTable,
        catalog: &ModelCatalog,
    ) -> Result<Self, CatalogError> {
        let mut onscreen = OnscreenModels::default();
        for record in table.records() {
            if record.sector() != *address {
                continue;
            }
            let (tile_x, tile_z) = record.slot();
            let slot = &mut onscreen.slots[tile_x * SECTOR_TILES + tile_z];
            if let Some(previous) = slot {
                tracing::trace!(
                    "Model {} replaces {} at ({}, {})",
                    record.model_id,
                    previous.model_id,
                    tile_x,
                    tile_z
                );
            }
            *slot = Some(ModelInstance {
                model: catalog.get(record.model_id)?,
                model_id: record.model_id,
                dir: record.dir,
                width: record.width,
                height: record.height,
                tile_x,
                tile_z,
            });
            onscreen.placed += 1;
        }
        Ok(onscreen)
    }

    pub fn get(&self, x: usize, z: usize) -> Option<&ModelInstance> {
        if x >= SECTOR_TILES || z >= SECTOR_TILES {
            return None;
        }
        self.slots[x * SECTOR_TILES + z].as_ref()
    }

    /// Occupied slots, x outer and z inner
    pub fn iter(&self) -> impl Iterator<Item = &ModelInstance> + '_ {
        self.slots.iter().flatten()
    }

    /// Placements that matched the sector, overwritten ones included
    pub fn instance_count(&self) -> usize {
        self.placed
    }

    pub fn occupied(&self) -> usize {
        self.iter().count()
    }
}
