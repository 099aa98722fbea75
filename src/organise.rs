//! The reorganise run: catalog -> album tree -> file mapping -> relocation.
//!
//! Also holds the small interactive prompts used when the catalog or the
//! exported album is not given on the command line.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::catalog::{discovery, CatalogReader};
use crate::error::IntegrityError;
use crate::mapping::{build_mapping, FileMapping};
use crate::naming::NamingStrategy;
use crate::relocate::{relocate_all, RelocationReport};
use crate::tree::{AlbumTree, RootSelector};

#[derive(Debug, Clone)]
pub struct OrganiseOptions {
    /// Folder the photo application exported into.
    pub export_folder: PathBuf,
    /// Base of the album folders. Usually the export folder itself.
    pub output_folder: PathBuf,
    pub naming: NamingStrategy,
    pub root: RootSelector,
    pub workers: usize,
}

#[derive(Debug)]
pub struct OrganiseResult {
    pub mapping: FileMapping,
    pub report: RelocationReport,
}

/// Load the album tree with a single catalog query.
pub fn load_tree<C: CatalogReader + ?Sized>(catalog: &C) -> Result<AlbumTree> {
    let albums = catalog.albums()?;
    let tree = AlbumTree::build(albums)?;
    if tree.is_empty() {
        warn!("Catalog has no albums");
    }
    info!("Loaded {} albums", tree.len());
    Ok(tree)
}

/// Reorganise the export folder into album folders.
///
/// Integrity problems abort before any file is touched; per-file failures are
/// collected in the returned report. Progress lines go to `out`.
pub fn organise<C: CatalogReader + ?Sized, W: Write>(
    catalog: &C,
    options: &OrganiseOptions,
    out: &mut W,
) -> Result<OrganiseResult> {
    if let RootSelector::Album(album_id) = &options.root {
        let album = catalog
            .album(album_id)?
            .ok_or_else(|| IntegrityError::UnknownRoot(album_id.clone()))?;
        info!("Organising album {:?} and its sub-albums", album.name);
    }

    let tree = load_tree(catalog)?;
    let paths = tree.paths(&options.root)?;

    writeln!(out, "Prepare operation...")?;
    let mapping = build_mapping(
        catalog,
        paths,
        &options.export_folder,
        &options.output_folder,
        options.naming,
    )?;
    info!(
        "Mapped {} exported files to {} destinations",
        mapping.len(),
        mapping.destination_count()
    );
    if mapping.is_empty() {
        warn!("No assets in the selected albums; nothing to move");
    }

    writeln!(out, "Move files into album folders...")?;
    out.flush()?;
    let report = relocate_all(&mapping, options.workers)?;
    info!(
        "Relocated {} files, {} sources failed",
        report.relocated,
        report.failed_sources()
    );

    Ok(OrganiseResult { mapping, report })
}

/// Print the end-of-run summary and one line per failed source.
pub fn print_summary<W: Write>(out: &mut W, result: &OrganiseResult) -> Result<()> {
    let report = &result.report;

    for failure in &report.failures {
        let destinations: Vec<_> = failure
            .destinations
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        if failure.error.is_missing_source() {
            writeln!(
                out,
                "File not found: \"{}\" (to be renamed to {:?})",
                failure.source.display(),
                destinations
            )?;
        } else {
            writeln!(
                out,
                "Failed to relocate \"{}\" (to be renamed to {:?}): {}",
                failure.source.display(),
                destinations,
                failure.error
            )?;
        }
    }

    writeln!(
        out,
        "Done. Moved {}/{} files ({} failed).",
        report.relocated,
        result.mapping.destination_count(),
        report.failed_destinations()
    )?;
    Ok(())
}

/// Print every album with its id, indented by depth.
pub fn list_albums<W: Write>(out: &mut W, tree: &AlbumTree) -> Result<()> {
    for path in tree.paths(&RootSelector::All)? {
        let album = path.leaf();
        writeln!(
            out,
            "{}{}{}",
            album.album_id,
            "  ".repeat(path.depth()),
            album.name
        )?;
    }
    Ok(())
}

/// Ask which album was exported. Empty input or `0` selects all albums.
pub fn prompt_root<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    tree: &AlbumTree,
) -> Result<RootSelector> {
    let mut choices = vec![RootSelector::All];

    writeln!(out, "Folders and albums:")?;
    writeln!(out, "{:5}. (all)", 0)?;
    for (i, path) in tree.paths(&RootSelector::All)?.enumerate() {
        let album = path.leaf();
        writeln!(out, "{:5}. {}{}", i + 1, "  ".repeat(path.depth()), album.name)?;
        choices.push(RootSelector::Album(album.album_id.clone()));
    }
    write!(out, "Which album/folder did you export? (Default: 0 = all): ")?;
    out.flush()?;

    let index = read_choice(input)?.unwrap_or(0);
    choices
        .get(index)
        .cloned()
        .with_context(|| format!("No album numbered {}", index))
}

/// Pick the catalog to use. Several candidates prompt the user; default 1.
pub fn select_catalog<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    candidates: &[PathBuf],
) -> Result<PathBuf> {
    match candidates {
        [] => bail!("No catalog found; pass its location with --library"),
        [only] => Ok(only.clone()),
        _ => {
            for (i, catalog) in candidates.iter().enumerate() {
                writeln!(out, "  [{}] {}", i + 1, catalog.display())?;
            }
            write!(out, "Select your catalog [1]: ")?;
            out.flush()?;

            let choice = read_choice(input)?.unwrap_or(1);
            choice
                .checked_sub(1)
                .and_then(|i| candidates.get(i))
                .cloned()
                .with_context(|| format!("No catalog numbered {}", choice))
        }
    }
}

/// Resolve the catalog from an explicit path, or discover it.
pub fn locate_catalog<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    explicit: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return discovery::resolve_catalog_path(path);
    }

    let base = discovery::default_catalog_root()
        .context("Cannot determine the local data directory; pass --library")?;
    let candidates = discovery::discover_catalogs(&base)?;
    select_catalog(input, out, &candidates)
}

fn read_choice<R: BufRead>(input: &mut R) -> Result<Option<usize>> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let choice = line
        .parse()
        .with_context(|| format!("Not a number: {:?}", line))?;
    Ok(Some(choice))
}
