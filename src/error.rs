//! Typed errors for the reorganisation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// The catalog's album hierarchy is inconsistent. Always fatal: raised before
/// any file is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("album {album_id:?} references unknown parent album {parent_id:?}")]
    UnknownParent { album_id: String, parent_id: String },

    #[error("root album {0:?} does not exist in the catalog")]
    UnknownRoot(String),
}

/// Why relocating one source file failed.
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("source file not found: {0}")]
    SourceMissing(PathBuf),

    #[error("failed to relocate to {destination}: {source}")]
    Io {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RelocateError {
    pub fn is_missing_source(&self) -> bool {
        matches!(self, RelocateError::SourceMissing(_))
    }
}
