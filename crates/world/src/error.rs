use thiserror::Error;

use crate::address::AddressError;
use crate::catalog::CatalogError;
use crate::model::ModelError;
use crate::placement::PlacementError;
use crate::sector::SectorError;
use crate::textures::TextureError;

/// Any failure while loading or navigating the world
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Sector(#[from] SectorError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}
