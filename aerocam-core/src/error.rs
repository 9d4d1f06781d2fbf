use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("photo folder not found: {}", path.display())]
    SourceUnavailable { path: PathBuf },

    #[error("photo folder is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl GalleryError {
    /// True when the photo folder itself cannot be read, as opposed to a
    /// failure partway through a listing.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            GalleryError::SourceUnavailable { .. } | GalleryError::NotADirectory { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
