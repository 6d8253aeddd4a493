// Texture index - id -> image path for the ground, wall and model texture
// directories. Decoding the images is left to the renderer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

const TEXTURES_DIR: &str = "textures";

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("cannot open directory: {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no {kind} texture with id {id}")]
    NotFound { kind: &'static str, id: u16 },
}

#[derive(Debug, Clone)]
pub struct TextureIndex {
    kind: &'static str,
    /// Wall textures carry an alpha channel
    transparent: bool,
    paths: BTreeMap<u16, PathBuf>,
}

impl TextureIndex {
    /// Index every file in `dir` whose stem is a number. Dot-files are skipped.
    pub fn scan(dir: &Path, kind: &'static str, transparent: bool) -> Result<Self, TextureError> {
        let read_err = |source: std::io::Error| TextureError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = BTreeMap::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match stem.parse::<u16>() {
                Ok(id) => {
                    paths.insert(id, path);
                }
                Err(_) => tracing::warn!("Ignoring texture {} without a numeric id", path.display()),
            }
        }

        tracing::debug!("{} {} textures in {}", paths.len(), kind, dir.display());
        Ok(TextureIndex {
            kind,
            transparent,
            paths,
        })
    }

    pub fn path(&self, id: u16) -> Result<&Path, TextureError> {
        self.paths
            .get(&id)
            .map(PathBuf::as_path)
            .ok_or(TextureError::NotFound { kind: self.kind, id })
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.paths.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The three texture directories under `<data_dir>/textures/`
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub ground: TextureIndex,
    pub wall: TextureIndex,
    pub model: TextureIndex,
}

impl TextureSet {
    pub fn load(data_dir: &Path) -> Result<Self, TextureError> {
        let root = data_dir.join(TEXTURES_DIR);
        Ok(TextureSet {
            ground: TextureIndex::scan(&root.join("ground"), "ground", false)?,
            model: TextureIndex::scan(&root.join("model"), "model", false)?,
            wall: TextureIndex::scan(&root.join("wall"), "wall", true)?,
        })
    }
}
