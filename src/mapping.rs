//! Source -> destinations mapping for one reorganisation run.

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::catalog::CatalogReader;
use crate::naming::{AssetNamer, NamingStrategy, NaturalNamer};
use crate::tree::AlbumPath;

/// Exported file -> every path it should end up at. A source with more than
/// one destination belongs to several albums.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileMapping {
    entries: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl FileMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `destination` for `source`, ignoring exact repeats.
    pub fn insert(&mut self, source: PathBuf, destination: PathBuf) {
        let destinations = self.entries.entry(source).or_default();
        if !destinations.contains(&destination) {
            destinations.push(destination);
        }
    }

    pub fn get(&self, source: &Path) -> Option<&[PathBuf]> {
        self.entries.get(source).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &Vec<PathBuf>)> {
        self.entries.iter()
    }

    /// Number of distinct source files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of destination paths across all sources.
    pub fn destination_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub(crate) fn entries(&self) -> &BTreeMap<PathBuf, Vec<PathBuf>> {
        &self.entries
    }
}

/// Build the mapping for every album in `paths`.
///
/// Source names are derived with the natural rule inside `export_folder`,
/// because that is how the flat export disambiguates clashing file names.
/// Destinations are named with `strategy` inside `output_folder` joined with
/// the album path.
pub fn build_mapping<'a, C, I>(
    catalog: &C,
    paths: I,
    export_folder: &Path,
    output_folder: &Path,
    strategy: NamingStrategy,
) -> Result<FileMapping>
where
    C: CatalogReader + ?Sized,
    I: IntoIterator<Item = AlbumPath<'a>>,
{
    let mut mapping = FileMapping::new();
    let mut input_namer = NaturalNamer::new();
    // Exported file -> asset that first claimed it.
    let mut owners: HashMap<PathBuf, String> = HashMap::new();

    let mut run_namer = strategy.namer();
    let mut folder_namers: HashMap<PathBuf, AssetNamer> = HashMap::new();

    for path in paths {
        let album = path.leaf();
        let folder = path.folder(output_folder);
        let assets = catalog.album_assets(&album.album_id)?;

        debug!(
            "Album {:?} ({} assets) -> {}",
            album.name,
            assets.len(),
            folder.display()
        );

        let output_namer = if strategy.is_run_scoped() {
            &mut run_namer
        } else {
            folder_namers
                .entry(folder.clone())
                .or_insert_with(|| strategy.namer())
        };

        for asset in &assets {
            let source = input_namer.name(asset, export_folder);
            if let Some(owner) = claim_source(&mut owners, &source, &asset.asset_id) {
                warn!(
                    "Assets {} and {} both map to exported file {}",
                    owner,
                    asset.asset_id,
                    source.display()
                );
            }
            let destination = output_namer.name(asset, &folder);
            mapping.insert(source, destination);
        }
    }

    Ok(mapping)
}

/// Record `asset_id` as the owner of `source`. Returns the earlier owner if a
/// different asset already holds that name.
fn claim_source(
    owners: &mut HashMap<PathBuf, String>,
    source: &Path,
    asset_id: &str,
) -> Option<String> {
    match owners.get(source) {
        Some(owner) if owner != asset_id => Some(owner.clone()),
        Some(_) => None,
        None => {
            owners.insert(source.to_path_buf(), asset_id.to_string());
            None
        }
    }
}
