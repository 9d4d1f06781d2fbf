use std::{fmt, path::PathBuf, sync::Arc};

use aerocam_config::Config;
use aerocam_core::{
    Clock, GalleryAssembler, GalleryError, GalleryService, MetadataExtractor, PhotoDirectory,
    PhotoInbox,
};

/// Room for multipart framing and the small text fields around the file.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub gallery: Arc<GalleryService>,
    pub inbox: Arc<PhotoInbox>,
    /// Route the photo folder is served under, e.g. `/foto`.
    pub serve_path: Arc<str>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("photo_dir", &self.photo_dir())
            .field("serve_path", &self.serve_path)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        gallery: GalleryService,
        inbox: PhotoInbox,
        serve_path: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            gallery: Arc::new(gallery),
            inbox: Arc::new(inbox),
            serve_path: serve_path.into(),
        }
    }

    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, GalleryError> {
        let gallery_config = &config.gallery;
        let extractor = MetadataExtractor::new(gallery_config.naming_options())?;
        let assembler = GalleryAssembler::new(extractor, gallery_config.gallery_options());
        let gallery = GalleryService::new(
            PhotoDirectory::new(gallery_config.photo_dir.clone()),
            assembler,
        );
        let inbox = PhotoInbox::new(
            gallery_config.photo_dir.clone(),
            config.upload.policy(),
            gallery_config.timezone,
            clock,
        );

        Ok(Self::new(gallery, inbox, gallery_config.serve_path()))
    }

    pub fn photo_dir(&self) -> PathBuf {
        self.gallery.directory().root().to_path_buf()
    }

    /// Request body ceiling for uploads.
    pub fn upload_body_limit(&self) -> usize {
        let limit = self
            .inbox
            .policy()
            .max_bytes
            .saturating_add(MULTIPART_OVERHEAD_BYTES);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}
