// src/migrate/resolver.rs

//! Legacy picture resolution: picture id -> gallery -> relative file path

use crate::error::{Error, Result};
use tracing::debug;

use super::traits::PictureStore;
use super::types::{LegacyPictureId, LegacyPictureRef};

/// Resolves legacy picture ids through two point lookups.
///
/// Holds no state besides the store; repeated ids are the cache's concern.
pub struct PictureResolver<'a> {
    store: &'a dyn PictureStore,
}

impl<'a> PictureResolver<'a> {
    pub fn new(store: &'a dyn PictureStore) -> Self {
        Self { store }
    }

    pub fn resolve(&self, id: LegacyPictureId) -> Result<LegacyPictureRef> {
        let picture = self
            .store
            .get_picture(id)?
            .ok_or_else(|| Error::NotFoundError(format!("legacy picture {id} does not exist")))?;

        let gallery = self.store.get_gallery(picture.gallery_id)?.ok_or_else(|| {
            Error::NotFoundError(format!(
                "gallery {} of legacy picture {id} does not exist",
                picture.gallery_id
            ))
        })?;

        let resolved = LegacyPictureRef::new(id, &gallery.path, &picture.filename)?;
        debug!("Resolved legacy picture {} to {}", id, resolved.path());
        Ok(resolved)
    }
}
