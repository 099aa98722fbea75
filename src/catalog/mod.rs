//! Read-only access to the photo catalog database.
//!
//! The catalog is a SQLite file owned by the photo application. It is opened
//! read-only and never modified; everything here is plain queries returning
//! records, with no reorganisation logic.

pub mod discovery;
pub mod models;
mod schema;

#[cfg(test)]
pub(crate) mod memory;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};

pub use discovery::{discover_catalogs, resolve_catalog_path, CATALOG_FILE_NAME};
pub use models::{Album, Asset};

/// Queries the reorganisation pipeline needs from a catalog.
pub trait CatalogReader {
    /// Every album, fetched in a single query.
    fn albums(&self) -> Result<Vec<Album>>;

    /// A single album by id, or `None` if it does not exist.
    fn album(&self, album_id: &str) -> Result<Option<Album>>;

    /// Assets of one album ordered by `(sortOrder, captureDate, filenameLC)`.
    fn album_assets(&self, album_id: &str) -> Result<Vec<Asset>>;
}

pub struct Catalog {
    conn: Connection,
    path: PathBuf,
    has_name_lc: bool,
}

impl Catalog {
    /// Open the catalog file without write access.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;

        let has_name_lc = has_column(&conn, "albums", "nameLC")?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            has_name_lc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogReader for Catalog {
    fn albums(&self) -> Result<Vec<Album>> {
        let sql = if self.has_name_lc {
            schema::SELECT_ALBUMS_WITH_NAME_LC
        } else {
            schema::SELECT_ALBUMS
        };
        let mut stmt = self.conn.prepare(sql)?;
        let albums = stmt
            .query_map([], album_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read albums")?;
        Ok(albums)
    }

    fn album(&self, album_id: &str) -> Result<Option<Album>> {
        let result = self
            .conn
            .query_row(schema::SELECT_ALBUM, [album_id], album_from_row);
        match result {
            Ok(album) => Ok(Some(album)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn album_assets(&self, album_id: &str) -> Result<Vec<Asset>> {
        let mut stmt = self.conn.prepare_cached(schema::SELECT_ALBUM_ASSETS)?;
        let assets = stmt
            .query_map([album_id], |row| {
                let filename: String = row.get(1)?;
                let filename_lowercase = row
                    .get::<_, Option<String>>(2)?
                    .unwrap_or_else(|| filename.to_lowercase());
                Ok(Asset {
                    asset_id: row.get(0)?,
                    filename,
                    filename_lowercase,
                    capture_date: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read assets of album {}", album_id))?;
        Ok(assets)
    }
}

fn album_from_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    let name: String = row.get::<_, Option<String>>(1)?.unwrap_or_default();
    let sort_key = row
        .get::<_, Option<String>>(2)?
        .unwrap_or_else(|| name.to_lowercase());
    Ok(Album {
        album_id: row.get(0)?,
        name,
        sort_key,
        parent_id: row.get(3)?,
    })
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names.iter().any(|name| name == column))
}
