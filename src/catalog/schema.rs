//! SQL used against the catalog (`Managed Catalog.wfindex`).

/// All albums, in one pass. Older catalogs lack `nameLC`, so the sort key
/// falls back to the lowercased name.
pub const SELECT_ALBUMS: &str = r#"
    SELECT albumId, name, LOWER(name), parentId
    FROM albums
"#;

pub const SELECT_ALBUMS_WITH_NAME_LC: &str = r#"
    SELECT albumId, name, COALESCE(nameLC, LOWER(name)), parentId
    FROM albums
"#;

pub const SELECT_ALBUM: &str = r#"
    SELECT albumId, name, LOWER(name), parentId
    FROM albums
    WHERE albumId = ?
"#;

/// Assets in one album, in album order. Ties on `sortOrder` are broken by
/// capture date, then lowercase file name.
pub const SELECT_ALBUM_ASSETS: &str = r#"
    SELECT a.assetId, a.filename, a.filenameLC, a.captureDate
    FROM assets a
    JOIN album_asset_v2 aa ON aa.assetId = a.assetId
    WHERE aa.albumId = ?
    ORDER BY aa.sortOrder, a.captureDate, a.filenameLC
"#;

/// Subset of the catalog layout, enough to build fixture catalogs.
#[cfg(test)]
pub const TEST_SCHEMA: &str = r#"
CREATE TABLE albums (
    docId INTEGER PRIMARY KEY,
    albumId VARCHAR(32) UNIQUE,
    name TEXT,
    nameLC TEXT,
    parentId VARCHAR(32) REFERENCES albums(albumId),
    subtype TEXT
);

CREATE TABLE assets (
    docId INTEGER PRIMARY KEY,
    captureDate TEXT,
    filename TEXT,
    filenameLC TEXT,
    assetId VARCHAR(32) UNIQUE
);

CREATE TABLE album_asset_v2 (
    docId INTEGER PRIMARY KEY,
    assetId VARCHAR(32) NOT NULL REFERENCES assets(assetId),
    albumId VARCHAR(32) NOT NULL REFERENCES albums(albumId),
    sortOrder VARCHAR(32)
);

CREATE UNIQUE INDEX album_asset_v2_index ON album_asset_v2(albumId, sortOrder, assetId);
"#;
