// WorldView - the single active view: tile grid, active sector, model
// instances and the assets they are built from
//
// Opening a sector builds a new grid and instance set off to the side and
// swaps them in only once every file has loaded.

use std::path::{Path, PathBuf};

use crate::address::{Direction, SectorAddress};
use crate::catalog::ModelCatalog;
use crate::error::WorldError;
use crate::geometry::primitives::{TilePrimitives, build_tile};
use crate::geometry::{GeometryParams, Layer, RenderOptions, TileGeometry};
use crate::grid::{Plane, WorldGrid};
use crate::placement::{ModelInstance, ModelTransform, OnscreenModels, PlacementTable};
use crate::sector::SectorStore;
use crate::textures::TextureSet;

#[derive(Debug)]
pub struct WorldView {
    data_dir: PathBuf,
    store: SectorStore,
    grid: WorldGrid,
    current: SectorAddress,
    ready: bool,
    catalog: ModelCatalog,
    placements: PlacementTable,
    onscreen: OnscreenModels,
    textures: Option<TextureSet>,
}

impl WorldView {
    /// View over already loaded assets. No sector is open yet.
    pub fn new(data_dir: &Path, placements: PlacementTable, catalog: ModelCatalog) -> Self {
        WorldView {
            data_dir: data_dir.to_path_buf(),
            store: SectorStore::new(data_dir),
            grid: WorldGrid::new(),
            current: SectorAddress::START,
            ready: false,
            catalog,
            placements,
            onscreen: OnscreenModels::default(),
            textures: None,
        }
    }

    /// Load the texture index, the placement table and every model it uses
    pub fn load(data_dir: &Path) -> Result<Self, WorldError> {
        tracing::info!("Loading world data from {}", data_dir.display());
        let textures = TextureSet::load(data_dir)?;
        let placements = PlacementTable::load(data_dir)?;
        let mut catalog = ModelCatalog::new(data_dir);
        placements.load_models(&mut catalog)?;

        let mut view = Self::new(data_dir, placements, catalog);
        view.textures = Some(textures);
        Ok(view)
    }

    /// Replace the grid and instances with those of `address`. On failure
    /// the previous sector stays in place but the view is left not ready.
    pub fn open_sector(&mut self, address: SectorAddress) -> Result<(), WorldError> {
        self.ready = false;

        let mut grid = WorldGrid::new();
        for plane in address.planes_to_load() {
            let tiles = self.store.load(plane, &address)?;
            grid.set_plane(plane, &tiles);
        }
        let onscreen = OnscreenModels::build(&address, &self.placements, &self.catalog)?;

        self.grid = grid;
        self.onscreen = onscreen;
        self.current = address;
        self.ready = true;
        tracing::info!(
            "Opened sector {} ({} models)",
            address,
            self.onscreen.instance_count()
        );
        Ok(())
    }

    /// Open the neighbouring sector. `None` when already at the world edge.
    pub fn step(&mut self, direction: Direction) -> Result<Option<SectorAddress>, WorldError> {
        let Some(next) = self.current.step(direction) else {
            tracing::debug!("No sector {:?} of {}", direction, self.current);
            return Ok(None);
        };
        self.open_sector(next)?;
        Ok(Some(next))
    }

    /// Layers drawn for the active sector, bottom-most last
    pub fn layers(&self, options: &RenderOptions) -> Vec<Layer> {
        if self.current.plane != Plane::Ground {
            return vec![Layer::standalone(self.current.plane)];
        }

        let mut layers = vec![Layer::ground_view(Plane::Ground)];
        if options.multi_story {
            layers.push(Layer::ground_view(Plane::Upper1));
            layers.push(Layer::ground_view(Plane::Upper2));
        }
        if options.underground {
            layers.push(Layer::ground_view(Plane::Underground));
        }
        layers
    }

    pub fn geometry(&self, params: GeometryParams) -> TileGeometry<'_> {
        TileGeometry::new(&self.grid, params)
    }

    /// Primitives of tile `(x, z)` for every visible layer. A tile outside
    /// the sector yields empty primitives.
    pub fn tile_primitives(
        &self,
        params: GeometryParams,
        options: &RenderOptions,
        x: usize,
        z: usize,
    ) -> Vec<(Layer, TilePrimitives)> {
        let geometry = self.geometry(params);
        self.layers(options)
            .into_iter()
            .map(|layer| (layer, build_tile(&geometry, layer, x, z, options)))
            .collect()
    }

    /// Model instances to draw; none while models are hidden
    pub fn instances(&self, options: &RenderOptions) -> impl Iterator<Item = &ModelInstance> + '_ {
        let show = options.show_models;
        self.onscreen.iter().filter(move |_| show)
    }

    /// Placement of an instance on the active grid
    pub fn instance_transform(&self, instance: &ModelInstance, tile_scale: f32) -> ModelTransform {
        let tile = self.grid.tile(self.current.plane, instance.tile_x, instance.tile_z);
        let ground = tile.height;
        instance.transform(tile_scale, ground)
    }

    pub fn instance_count(&self) -> usize {
        self.onscreen.instance_count()
    }

    pub fn onscreen(&self) -> &OnscreenModels {
        &self.onscreen
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn current(&self) -> SectorAddress {
        self.current
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn placements(&self) -> &PlacementTable {
        &self.placements
    }

    pub fn textures(&self) -> Option<&TextureSet> {
        self.textures.as_ref()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::triangle;
    use crate::sector::TILE_RECORD_SIZE;
    use crate::sector::tests::sector_bytes;

    const TABLE: &str = "340,530,0,1,1,1,tree\n340,480,0,1,1,1,tree\n";

    fn write_sector(dir: &Path, address: SectorAddress, plane: Plane, record: [u8; TILE_RECORD_SIZE]) {
        let sectors = dir.join("sectors");
        std::fs::create_dir_all(&sectors).unwrap();
        let name = SectorStore::file_name(plane, address.x, address.y);
        std::fs::write(sectors.join(name), sector_bytes(record)).unwrap();
    }

    fn write_world(dir: &Path) {
        std::fs::create_dir_all(dir.join("models")).unwrap();
        std::fs::write(dir.join("models/tree.ob3"), triangle()).unwrap();
        std::fs::write(dir.join("model_locs.csv"), TABLE).unwrap();
        for kind in ["ground", "wall", "model"] {
            std::fs::create_dir_all(dir.join("textures").join(kind)).unwrap();
        }
        for plane in Plane::ALL {
            let height = 10 * (plane.index() + 1);
            write_sector(dir, SectorAddress::START, plane, [height, 0, plane.index(), 0, 0, 0, 0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_open_start_sector() {
        let dir = tempfile::tempdir().unwrap();
        write_world(dir.path());

        let mut view = WorldView::load(dir.path()).unwrap();
        assert!(!view.is_ready());
        assert!(view.textures().is_some());
        view.open_sector(SectorAddress::START).unwrap();

        assert!(view.is_ready());
        assert_eq!(view.current(), SectorAddress::START);
        assert_eq!(view.grid().tile(Plane::Ground, 0, 0).height, 10);
        assert_eq!(view.grid().tile(Plane::Upper2, 47, 47).texture, 2);
        // underground heights are discarded on load
        assert_eq!(view.grid().tile(Plane::Underground, 5, 5).height, 0);

        assert_eq!(view.instance_count(), 1);
        let instance = view.onscreen().get(340 % 48, 530 % 48).unwrap();
        assert_eq!(instance.model_id, 1);
        let transform = view.instance_transform(instance, 4.0);
        assert!((transform.translation.y + 10.0 / 255.0 * 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_layers_follow_options() {
        let dir = tempfile::tempdir().unwrap();
        write_world(dir.path());
        let mut view = WorldView::load(dir.path()).unwrap();
        view.open_sector(SectorAddress::START).unwrap();

        assert_eq!(view.layers(&RenderOptions::default()).len(), 4);
        let options = RenderOptions {
            multi_story: false,
            underground: false,
            show_models: false,
            ..RenderOptions::default()
        };
        assert_eq!(view.layers(&options), vec![Layer::ground_view(Plane::Ground)]);
        assert_eq!(view.instances(&options).count(), 0);
        assert_eq!(view.instances(&RenderOptions::default()).count(), 1);

        let prims = view.tile_primitives(GeometryParams::default(), &RenderOptions::default(), 3, 3);
        assert_eq!(prims.len(), 4);
        // the ground plane is untextured: one flat quad
        assert_eq!(prims[0].1.terrain.len(), 1);

        let outside = view.tile_primitives(GeometryParams::default(), &RenderOptions::default(), 48, 3);
        assert!(outside.iter().all(|(_, prims)| prims.is_empty()));
    }

    #[test]
    fn test_upper_sector_opens_alone() {
        let dir = tempfile::tempdir().unwrap();
        write_world(dir.path());
        let mut view = WorldView::load(dir.path()).unwrap();

        let upper = SectorAddress { plane: Plane::Upper1, ..SectorAddress::START };
        std::fs::remove_file(dir.path().join("sectors/h0x55y48")).unwrap();
        view.open_sector(upper).unwrap();

        assert_eq!(view.layers(&RenderOptions::default()), vec![Layer::standalone(Plane::Upper1)]);
        assert_eq!(view.grid().tile(Plane::Ground, 0, 0).height, 0);
        assert_eq!(view.grid().tile(Plane::Upper1, 0, 0).height, 20);
        // the table holds no upper-floor placements
        assert_eq!(view.instance_count(), 0);
    }

    #[test]
    fn test_step_and_missing_sector() {
        let dir = tempfile::tempdir().unwrap();
        write_world(dir.path());
        let north = SectorAddress { y: 47, ..SectorAddress::START };
        for plane in Plane::ALL {
            write_sector(dir.path(), north, plane, [1; TILE_RECORD_SIZE]);
        }

        let mut view = WorldView::load(dir.path()).unwrap();
        view.open_sector(SectorAddress::START).unwrap();
        assert_eq!(view.step(Direction::North).unwrap(), Some(north));
        assert_eq!(view.current(), north);
        assert_eq!(view.instance_count(), 1);
        assert_eq!(view.grid().tile(Plane::Ground, 0, 0).height, 1);

        // nothing stored further north; the grid is kept, the view is not ready
        let err = view.step(Direction::North).unwrap_err();
        assert!(err.to_string().contains("h0x55y46"), "{err}");
        assert!(!view.is_ready());
        assert_eq!(view.current(), north);
        assert_eq!(view.grid().tile(Plane::Ground, 0, 0).height, 1);
    }

    #[test]
    fn test_step_stops_at_world_edge() {
        let dir = tempfile::tempdir().unwrap();
        write_world(dir.path());
        let mut view = WorldView::load(dir.path()).unwrap();
        let edge = SectorAddress::new(48, 48, Plane::Ground).unwrap();
        view.current = edge;
        assert_eq!(view.step(Direction::East).unwrap(), None);
        assert_eq!(view.current(), edge);
    }

    #[test]
    fn test_load_requires_placement_table() {
        let dir = tempfile::tempdir().unwrap();
        write_world(dir.path());
        std::fs::remove_file(dir.path().join("model_locs.csv")).unwrap();
        let err = WorldView::load(dir.path()).unwrap_err();
        assert!(matches!(err, WorldError::Placement(_)), "{err}");
    }
}
