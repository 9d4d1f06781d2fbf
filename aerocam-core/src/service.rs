use aerocam_model::{GalleryListing, GalleryQuery, TitleCatalog};

use crate::error::Result;
use crate::gallery::GalleryAssembler;
use crate::scanner::PhotoDirectory;

/// Folder plus assembler: one blocking pass per call, nothing cached.
#[derive(Debug, Clone)]
pub struct GalleryService {
    directory: PhotoDirectory,
    assembler: GalleryAssembler,
}

impl GalleryService {
    pub fn new(directory: PhotoDirectory, assembler: GalleryAssembler) -> Self {
        Self {
            directory,
            assembler,
        }
    }

    pub fn directory(&self) -> &PhotoDirectory {
        &self.directory
    }

    pub fn assembler(&self) -> &GalleryAssembler {
        &self.assembler
    }

    pub fn listing(&self, query: &GalleryQuery) -> Result<GalleryListing> {
        let facts = self.directory.scan()?;
        Ok(self.assembler.assemble(&facts, query))
    }

    pub fn catalog(&self) -> Result<TitleCatalog> {
        let facts = self.directory.scan()?;
        Ok(self.assembler.catalog(&facts))
    }
}
