use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const CATALOG_FILE_NAME: &str = "Managed Catalog.wfindex";

/// Where the photo application keeps its per-user catalog folders.
pub fn default_catalog_root() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join("Adobe").join("Lightroom CC").join("Data"))
}

/// Find every catalog file one level below `base`.
pub fn discover_catalogs(base: &Path) -> Result<Vec<PathBuf>> {
    let mut catalogs = Vec::new();

    if !base.is_dir() {
        return Ok(catalogs);
    }

    for entry in WalkDir::new(base)
        .min_depth(2)
        .max_depth(2)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && entry.file_name() == CATALOG_FILE_NAME {
            catalogs.push(entry.into_path());
        }
    }

    catalogs.sort();
    Ok(catalogs)
}

/// Turn a user-supplied path into a catalog file path. A directory is taken
/// to contain the catalog file.
pub fn resolve_catalog_path(path: &Path) -> Result<PathBuf> {
    let resolved = if path.is_dir() {
        path.join(CATALOG_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    if !resolved.is_file() {
        bail!("Catalog not found: {}", resolved.display());
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_discover_catalogs() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("one")).unwrap();
        fs::create_dir(dir.path().join("two")).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        File::create(dir.path().join("one").join(CATALOG_FILE_NAME)).unwrap();
        File::create(dir.path().join("two").join(CATALOG_FILE_NAME)).unwrap();
        File::create(dir.path().join("empty").join("other.db")).unwrap();

        let catalogs = discover_catalogs(dir.path()).unwrap();

        assert_eq!(
            catalogs,
            vec![
                dir.path().join("one").join(CATALOG_FILE_NAME),
                dir.path().join("two").join(CATALOG_FILE_NAME),
            ]
        );
    }

    #[test]
    fn test_discover_missing_base() {
        let dir = tempdir().unwrap();
        assert!(discover_catalogs(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_directory() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join(CATALOG_FILE_NAME)).unwrap();

        let resolved = resolve_catalog_path(dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join(CATALOG_FILE_NAME));
        assert!(resolve_catalog_path(&dir.path().join("missing.wfindex")).is_err());
    }
}
