//! Records read from the catalog tables.

/// A node in the album hierarchy (`albums` table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub album_id: String,
    pub name: String,
    /// Case-insensitive sort key for sibling ordering.
    pub sort_key: String,
    /// `None` marks a top-level album.
    pub parent_id: Option<String>,
}

impl Album {
    pub fn new(album_id: &str, name: &str, parent_id: Option<&str>) -> Self {
        Self {
            album_id: album_id.to_string(),
            name: name.to_string(),
            sort_key: name.to_lowercase(),
            parent_id: parent_id.map(str::to_string),
        }
    }
}

/// One logical photo or video (`assets` table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub asset_id: String,
    /// Original file name including extension.
    pub filename: String,
    pub filename_lowercase: String,
    pub capture_date: Option<String>,
}

impl Asset {
    pub fn new(asset_id: &str, filename: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            filename: filename.to_string(),
            filename_lowercase: filename.to_lowercase(),
            capture_date: None,
        }
    }
}
