//! In-memory catalog for tests that do not need SQLite.

use anyhow::Result;
use std::collections::HashMap;

use super::models::{Album, Asset};
use super::CatalogReader;

#[derive(Default)]
pub struct MemoryCatalog {
    pub albums: Vec<Album>,
    /// Album id -> assets, already in album order.
    pub assets: HashMap<String, Vec<Asset>>,
}

impl MemoryCatalog {
    pub fn with_album(mut self, album: Album, assets: Vec<Asset>) -> Self {
        self.assets.insert(album.album_id.clone(), assets);
        self.albums.push(album);
        self
    }
}

impl CatalogReader for MemoryCatalog {
    fn albums(&self) -> Result<Vec<Album>> {
        Ok(self.albums.clone())
    }

    fn album(&self, album_id: &str) -> Result<Option<Album>> {
        Ok(self.albums.iter().find(|a| a.album_id == album_id).cloned())
    }

    fn album_assets(&self, album_id: &str) -> Result<Vec<Asset>> {
        Ok(self.assets.get(album_id).cloned().unwrap_or_default())
    }
}
