// Model catalog - each distinct model id decoded once and shared by every
// instance that references it

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::model::{ModelDefinition, ModelError};

const MODELS_DIR: &str = "models";
const MODEL_EXTENSION: &str = "ob3";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("model id {0} is not in the catalog")]
    UnknownModel(u16),

    #[error("model id {id} is already in the catalog")]
    Duplicate { id: u16 },

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug)]
pub struct ModelCatalog {
    models_dir: PathBuf,
    models: HashMap<u16, Arc<ModelDefinition>>,
}

impl ModelCatalog {
    pub fn new(data_dir: &Path) -> Self {
        ModelCatalog {
            models_dir: data_dir.join(MODELS_DIR),
            models: HashMap::new(),
        }
    }

    pub fn model_path(&self, name: &str) -> PathBuf {
        self.models_dir.join(format!("{name}.{MODEL_EXTENSION}"))
    }

    /// Decode model `name` under `id` unless that id is already loaded.
    /// A later record with a known id never re-reads the file.
    pub fn load(&mut self, id: u16, name: &str) -> Result<Arc<ModelDefinition>, CatalogError> {
        if let Some(model) = self.models.get(&id) {
            return Ok(Arc::clone(model));
        }

        let path = self.model_path(name);
        tracing::debug!("Loading model {} ({})", id, path.display());
        let model = Arc::new(ModelDefinition::load(&path)?);
        tracing::trace!(
            "Model {}: {} vertices, {} faces",
            id,
            model.vertex_count(),
            model.face_count()
        );
        self.models.insert(id, Arc::clone(&model));
        Ok(model)
    }

    /// Register an already decoded model
    pub fn insert(&mut self, id: u16, model: ModelDefinition) -> Result<Arc<ModelDefinition>, CatalogError> {
        if self.models.contains_key(&id) {
            return Err(CatalogError::Duplicate { id });
        }
        let model = Arc::new(model);
        self.models.insert(id, Arc::clone(&model));
        Ok(model)
    }

    pub fn get(&self, id: u16) -> Result<Arc<ModelDefinition>, CatalogError> {
        self.models
            .get(&id)
            .cloned()
            .ok_or(CatalogError::UnknownModel(id))
    }

    pub fn contains(&self, id: u16) -> bool {
        self.models.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::triangle;

    fn write_model(dir: &Path, name: &str, bytes: &[u8]) {
        let models = dir.join(MODELS_DIR);
        std::fs::create_dir_all(&models).unwrap();
        std::fs::write(models.join(format!("{name}.{MODEL_EXTENSION}")), bytes).unwrap();
    }

    #[test]
    fn test_load_once_per_id() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "tree", &triangle());

        let mut catalog = ModelCatalog::new(dir.path());
        let first = catalog.load(1, "tree").unwrap();
        // the file is gone; the cached copy answers
        std::fs::remove_file(catalog.model_path("tree")).unwrap();
        let second = catalog.load(1, "tree").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(catalog.len(), 1);
        assert_eq!(first.face_count(), 1);
    }

    #[test]
    fn test_unknown_model() {
        let catalog = ModelCatalog::new(Path::new("/nonexistent"));
        assert!(catalog.is_empty());
        assert!(matches!(catalog.get(42), Err(CatalogError::UnknownModel(42))));
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut catalog = ModelCatalog::new(Path::new("/nonexistent"));
        let model = ModelDefinition::from_bytes(&triangle()).unwrap();
        catalog.insert(7, model.clone()).unwrap();
        assert!(matches!(catalog.insert(7, model), Err(CatalogError::Duplicate { id: 7 })));
        assert!(catalog.contains(7));
        assert_eq!(catalog.get(7).unwrap().vertex_count(), 3);
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = ModelCatalog::new(dir.path());
        let err = catalog.load(3, "rock").unwrap_err();
        assert!(err.to_string().contains("rock.ob3"), "{err}");
        assert!(catalog.is_empty());
    }
}
