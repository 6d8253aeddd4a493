// JSON reports printed by the subcommands

use serde::Serialize;

use mapview_world::address::band_for;
use mapview_world::geometry::TilePrimitives;
use mapview_world::model::{FaceFill, IndexWidth};
use mapview_world::placement::ModelTransform;
use mapview_world::{
    GeometryParams, Layer, ModelDefinition, Plane, RenderOptions, SECTOR_TILES, SectorAddress,
    WorldView, coordinates_to_sector,
};

#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub x: u16,
    pub y: u16,
    pub band: Plane,
    pub band_y: u16,
    pub sector: String,
    pub address: SectorAddress,
    pub tile_x: u16,
    pub tile_z: u16,
    /// False when the sector lies outside the navigable world
    pub in_world: bool,
}

impl LocateReport {
    pub fn new(x: u16, y: u16) -> Self {
        let (band, band_y) = band_for(y);
        let address = coordinates_to_sector(x, y);
        let tiles = SECTOR_TILES as u16;
        LocateReport {
            x,
            y,
            band,
            band_y,
            sector: address.to_string(),
            address,
            tile_x: x % tiles,
            tile_z: y % tiles,
            in_world: SectorAddress::new(address.x, address.y, address.plane).is_ok(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct PlaneStats {
    pub plane: u8,
    pub textured: usize,
    pub void: usize,
    pub walls_east: usize,
    pub walls_north: usize,
    pub walls_diagonal: usize,
    pub invisible_walls: usize,
    pub max_height: u8,
}

#[derive(Debug, Serialize)]
pub struct SectorReport {
    pub sector: String,
    pub ready: bool,
    pub planes: Vec<PlaneStats>,
    pub placed_models: usize,
    pub occupied_tiles: usize,
    pub catalog_models: usize,
}

impl SectorReport {
    pub fn new(view: &WorldView) -> Self {
        let planes = view
            .current()
            .planes_to_load()
            .into_iter()
            .map(|plane| {
                let mut stats = PlaneStats {
                    plane: plane.index(),
                    ..PlaneStats::default()
                };
                for (_, _, tile) in view.grid().plane_tiles(plane) {
                    stats.textured += usize::from(tile.is_textured());
                    stats.void += usize::from(tile.is_void());
                    stats.walls_east += usize::from(tile.wall_east != 0);
                    stats.walls_north += usize::from(tile.wall_north != 0);
                    stats.walls_diagonal += usize::from(tile.diagonal_wall().is_some());
                    stats.invisible_walls += usize::from(tile.has_invisible_wall());
                    stats.max_height = stats.max_height.max(tile.height);
                }
                stats
            })
            .collect();

        SectorReport {
            sector: view.current().to_string(),
            ready: view.is_ready(),
            planes,
            placed_models: view.instance_count(),
            occupied_tiles: view.onscreen().occupied(),
            catalog_models: view.catalog().len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LayerPrimitives {
    pub layer: Layer,
    pub primitives: TilePrimitives,
}

#[derive(Debug, Serialize)]
pub struct InstanceReport {
    pub model_id: u16,
    pub dir: u8,
    pub width: u8,
    pub height: u8,
    pub transform: ModelTransform,
}

#[derive(Debug, Serialize)]
pub struct GeometryReport {
    pub sector: String,
    pub tile_x: usize,
    pub tile_z: usize,
    pub layers: Vec<LayerPrimitives>,
    pub model: Option<InstanceReport>,
}

impl GeometryReport {
    pub fn new(
        view: &WorldView,
        params: GeometryParams,
        options: &RenderOptions,
        tile_x: usize,
        tile_z: usize,
    ) -> Self {
        let layers = view
            .tile_primitives(params, options, tile_x, tile_z)
            .into_iter()
            .map(|(layer, primitives)| LayerPrimitives { layer, primitives })
            .collect();

        let model = view
            .instances(options)
            .find(|instance| (instance.tile_x, instance.tile_z) == (tile_x, tile_z))
            .map(|instance| InstanceReport {
                model_id: instance.model_id,
                dir: instance.dir,
                width: instance.width,
                height: instance.height,
                transform: view.instance_transform(instance, params.tile_scale),
            });

        GeometryReport {
            sector: view.current().to_string(),
            tile_x,
            tile_z,
            layers,
            model,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelReport {
    pub name: String,
    pub vertices: usize,
    pub faces: usize,
    pub index_width: IndexWidth,
    pub gouraud_faces: usize,
    pub textured_faces: usize,
    pub colored_faces: usize,
    pub bounds: Option<[[i16; 3]; 2]>,
}

impl ModelReport {
    pub fn new(name: &str, model: &ModelDefinition) -> Self {
        let textured = |fill: &FaceFill| matches!(fill, FaceFill::Texture(_));
        let faces = model.face_count();

        let bounds = (0..model.vertex_count())
            .filter_map(|i| model.vertex(i))
            .fold(None, |acc: Option<[[i16; 3]; 2]>, v| {
                let [mut lo, mut hi] = acc.unwrap_or([v, v]);
                for axis in 0..3 {
                    lo[axis] = lo[axis].min(v[axis]);
                    hi[axis] = hi[axis].max(v[axis]);
                }
                Some([lo, hi])
            });

        ModelReport {
            name: name.to_string(),
            vertices: model.vertex_count(),
            faces,
            index_width: model.index_width(),
            gouraud_faces: model.face_gouraud.iter().filter(|g| **g).count(),
            textured_faces: (0..faces)
                .filter(|&f| {
                    model.face_fill_front.get(f).is_some_and(textured)
                        || model.face_fill_back.get(f).is_some_and(textured)
                })
                .count(),
            colored_faces: (0..faces).filter(|&f| model.face_color(f).is_some()).count(),
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_report() {
        let report = LocateReport::new(330, 530);
        assert_eq!(report.sector, "h0x54y48");
        assert_eq!(report.band, Plane::Ground);
        assert_eq!((report.tile_x, report.tile_z), (330 % 48, 530 % 48));
        assert!(report.in_world);

        let report = LocateReport::new(4000, 1100);
        assert_eq!(report.band, Plane::Upper1);
        assert_eq!(report.band_y, 1100 - 943);
        assert!(!report.in_world);
    }

    #[test]
    fn test_model_report_bounds() {
        let model = ModelDefinition {
            vertices_x: vec![0, 10, -5],
            vertices_y: vec![3, -2, 8],
            vertices_z: vec![1, 1, 1],
            face_vertices: vec![vec![0, 1, 2]],
            face_fill_back: vec![FaceFill::Texture(4)],
            face_fill_front: vec![FaceFill::Color(-1)],
            face_gouraud: vec![true],
        };
        let report = ModelReport::new("crate", &model);
        assert_eq!(report.bounds, Some([[-5, -2, 1], [10, 8, 1]]));
        assert_eq!(report.textured_faces, 1);
        assert_eq!(report.colored_faces, 1);
        assert_eq!(report.gouraud_faces, 1);
        assert_eq!(report.index_width, IndexWidth::U8);
    }
}
