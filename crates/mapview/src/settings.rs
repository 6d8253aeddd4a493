// Viewer settings read from mapview.conf (or Mapview_* environment variables)

use std::path::PathBuf;

use mapview_shared::config::Config;
use mapview_world::address::AddressError;
use mapview_world::{GeometryParams, RenderOptions, SectorAddress};

const DEFAULT_DATA_DIR: &str = "./data/";
const DEFAULT_LOG_LEVEL: i32 = 2;

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub logs_dir: Option<String>,
    pub log_level: i32,
    pub start_x: i32,
    pub start_y: i32,
    pub start_plane: i32,
    pub tile_scale: f32,
    pub options: RenderOptions,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        let defaults = RenderOptions::default();
        let start = SectorAddress::START;
        let logs_dir = config.get_string("LogsDir");

        Settings {
            data_dir: PathBuf::from(config.get_string_or("DataDir", DEFAULT_DATA_DIR)),
            logs_dir: (!logs_dir.is_empty()).then_some(logs_dir),
            log_level: config.get_or("LogLevel", DEFAULT_LOG_LEVEL),
            start_x: config.get_or("StartSectorX", i32::from(start.x)),
            start_y: config.get_or("StartSectorY", i32::from(start.y)),
            start_plane: config.get_or("StartSectorH", i32::from(start.plane.index())),
            tile_scale: config.get_or("TileScale", GeometryParams::default().tile_scale),
            options: RenderOptions {
                tile_crop: config.get_bool_or("TileCrop", defaults.tile_crop),
                show_terrain: config.get_bool_or("ShowTerrain", defaults.show_terrain),
                underground: config.get_bool_or("Underground", defaults.underground),
                multi_story: config.get_bool_or("MultiStory", defaults.multi_story),
                show_walls: config.get_bool_or("ShowWalls", defaults.show_walls),
                wire_frame: config.get_bool_or("WireFrame", defaults.wire_frame),
                show_models: config.get_bool_or("ShowModels", defaults.show_models),
            },
        }
    }

    /// Sector to open when none is given on the command line
    pub fn start_sector(&self) -> Result<SectorAddress, AddressError> {
        sector_from(self.start_x, self.start_y, self.start_plane)
    }

    pub fn geometry_params(&self) -> GeometryParams {
        GeometryParams {
            tile_scale: self.tile_scale,
            ..GeometryParams::default()
        }
    }
}

/// Bounds-checked sector address from loosely typed input
pub fn sector_from(x: i32, y: i32, plane: i32) -> Result<SectorAddress, AddressError> {
    let clamp = |v: i32| u16::try_from(v).unwrap_or(u16::MAX);
    let plane = u8::try_from(plane).unwrap_or(u8::MAX);
    SectorAddress::from_parts(clamp(x), clamp(y), plane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapview_world::Plane;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_config(&Config::new());
        assert_eq!(settings.data_dir, PathBuf::from("./data/"));
        assert_eq!(settings.logs_dir, None);
        assert_eq!(settings.tile_scale, 4.0);
        assert_eq!(settings.options, RenderOptions::default());
        assert_eq!(settings.start_sector().unwrap(), SectorAddress::START);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::new();
        config.parse(
            "DataDir = /srv/world\nLogsDir = logs\nStartSectorX = 60\nStartSectorY = 40\nStartSectorH = 1\nTileScale = 2\nWireFrame = 0\nShowModels = false\n",
        );
        let settings = Settings::from_config(&config);

        assert_eq!(settings.data_dir, PathBuf::from("/srv/world"));
        assert_eq!(settings.logs_dir.as_deref(), Some("logs"));
        assert_eq!(settings.geometry_params().tile_scale, 2.0);
        assert!(!settings.options.wire_frame);
        assert!(!settings.options.show_models);
        assert!(settings.options.show_walls);
        assert_eq!(
            settings.start_sector().unwrap(),
            SectorAddress { x: 60, y: 40, plane: Plane::Upper1 }
        );
    }

    #[test]
    fn test_start_sector_out_of_bounds() {
        assert_eq!(sector_from(70, 40, 0), Err(AddressError::OutOfBounds { x: 70, y: 40 }));
        assert_eq!(sector_from(55, 48, 4), Err(AddressError::InvalidPlane(4)));
        assert!(sector_from(-1, 48, 0).is_err());
    }
}
