use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use aerocam_model::FileFact;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{GalleryError, Result};

/// Extensions listed by default, lower-case.
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Non-recursive reader for the photo folder.
#[derive(Debug, Clone)]
pub struct PhotoDirectory {
    root: PathBuf,
    /// Lower-case image extensions that are listed.
    pub image_extensions: Vec<String>,
    /// Whether symlinked files are listed as their targets.
    pub follow_links: bool,
}

impl PhotoDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.map(String::from).to_vec(),
            follow_links: true,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.image_extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extension check, case-insensitive. Hidden files never qualify.
    pub fn is_image_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.image_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Read facts for every image in the folder, newest first.
    pub fn scan(&self) -> Result<Vec<FileFact>> {
        let root = self.root.as_path();
        debug!("Scanning photo folder {}", root.display());

        if !root.exists() {
            return Err(GalleryError::SourceUnavailable {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(GalleryError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links);

        let mut facts = Vec::new();
        let mut skipped = 0usize;
        for entry in walker {
            match entry {
                Ok(entry) => match self.read_entry(&entry) {
                    Ok(Some(fact)) => facts.push(fact),
                    Ok(None) => skipped += 1,
                    Err(e) => {
                        warn!("Skipping {}: {}", entry.path().display(), e);
                        skipped += 1;
                    }
                },
                Err(e) => {
                    warn!("Error walking photo folder: {}", e);
                    skipped += 1;
                }
            }
        }

        facts.sort_by(|a, b| {
            b.modified_unix
                .cmp(&a.modified_unix)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        info!(
            "Scanned {}: {} photos, {} other entries skipped",
            root.display(),
            facts.len(),
            skipped
        );
        Ok(facts)
    }

    fn read_entry(&self, entry: &DirEntry) -> Result<Option<FileFact>> {
        if !entry.file_type().is_file() {
            return Ok(None);
        }

        let path = entry.path();
        if !self.is_image_file(path) {
            return Ok(None);
        }

        let Some(filename) = entry.file_name().to_str() else {
            warn!("Skipping non UTF-8 filename {}", path.display());
            return Ok(None);
        };

        let metadata = entry.metadata()?;
        let modified = match metadata.modified() {
            Ok(time) => unix_seconds(time),
            Err(e) => {
                warn!("No modification time for {}: {}", path.display(), e);
                0
            }
        };

        Ok(Some(FileFact::new(filename, metadata.len(), modified)))
    }
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_secs())
            .map(|secs| -secs)
            .unwrap_or(i64::MIN),
    }
}
