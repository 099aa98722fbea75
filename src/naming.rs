//! Output file names for exported assets.
//!
//! The photo application re-encodes stills to JPEG on export but keeps videos
//! in their original container, so an asset's exported name is its original
//! base name plus a mapped extension. Two strategies keep names unique:
//!
//! ```text
//! indexed:  1.IMG_0001.jpg  2.IMG_0002.jpg  3.IMG_0001.jpg
//! natural:  IMG_0001.jpg    IMG_0002.jpg    IMG_0001-2.jpg
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::catalog::Asset;

/// Video containers the exporter leaves untouched.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".3gp", ".3gpp", ".avi", ".m2t", ".m2ts", ".m4v", ".mov", ".mpg", ".mp2", ".mp4", ".mpeg",
    ".mts", ".wmv",
];

/// Extension of the exported file given the original extension (with dot).
pub fn map_ext(ext: &str) -> &str {
    let lower = ext.to_lowercase();
    if VIDEO_EXTENSIONS.contains(&lower.as_str()) {
        ext
    } else {
        ".jpg"
    }
}

/// Split a file name into base name and extension (with dot). Leading dots
/// belong to the base name, so `.hidden` has no extension.
pub fn split_filename(filename: &str) -> (&str, &str) {
    let leading = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading..].rfind('.') {
        Some(dot) => filename.split_at(leading + dot),
        None => (filename, ""),
    }
}

/// Which naming strategy to use for reorganised files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// `<n>.<name>.jpg`, preserving album order.
    #[default]
    Indexed,
    /// `<name>.jpg`, `<name>-2.jpg`, ... preserving original names.
    Natural,
}

impl NamingStrategy {
    pub fn namer(self) -> AssetNamer {
        match self {
            NamingStrategy::Indexed => AssetNamer::Indexed(IndexedNamer::new()),
            NamingStrategy::Natural => AssetNamer::Natural(NaturalNamer::new()),
        }
    }

    /// Whether one namer instance must serve the whole run, as opposed to one
    /// instance per destination folder.
    pub fn is_run_scoped(self) -> bool {
        matches!(self, NamingStrategy::Natural)
    }
}

/// Prefixes a running counter: `<folder>/<n>.<base><ext>`.
#[derive(Debug)]
pub struct IndexedNamer {
    next: u64,
}

impl Default for IndexedNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedNamer {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn name(&mut self, asset: &Asset, folder: &Path) -> PathBuf {
        let index = self.next;
        self.next += 1;

        let (base, ext) = split_filename(&asset.filename);
        folder.join(format!("{}.{}{}", index, base, map_ext(ext)))
    }
}

/// Keeps the original name, appending `-<k>` from the second occurrence of a
/// lowercase file name anywhere in the run.
#[derive(Debug, Default)]
pub struct NaturalNamer {
    /// Lowercase file name -> occurrences handed out so far.
    seen: HashMap<String, u64>,
    /// (folder, asset id) -> name already given.
    assigned: HashMap<(PathBuf, String), PathBuf>,
}

impl NaturalNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, asset: &Asset, folder: &Path) -> PathBuf {
        let key = (folder.to_path_buf(), asset.asset_id.clone());
        if let Some(path) = self.assigned.get(&key) {
            return path.clone();
        }

        let count = self
            .seen
            .entry(asset.filename_lowercase.clone())
            .or_insert(0);
        *count += 1;

        let (base, ext) = split_filename(&asset.filename);
        let filename = if *count == 1 {
            format!("{}{}", base, map_ext(ext))
        } else {
            format!("{}-{}{}", base, count, map_ext(ext))
        };

        let path = folder.join(filename);
        self.assigned.insert(key, path.clone());
        path
    }
}

/// A naming strategy together with its state for the current run.
#[derive(Debug)]
pub enum AssetNamer {
    Indexed(IndexedNamer),
    Natural(NaturalNamer),
}

impl AssetNamer {
    /// Unique path for `asset` inside `folder`.
    pub fn name(&mut self, asset: &Asset, folder: &Path) -> PathBuf {
        match self {
            AssetNamer::Indexed(namer) => namer.name(asset, folder),
            AssetNamer::Natural(namer) => namer.name(asset, folder),
        }
    }
}
