//! Aerocam core library.
//!
//! Turns a folder of camera uploads into a gallery listing:
//!
//! - [`naming`] reads titles, owner ids and capture times out of filenames.
//! - [`gallery`] builds records, the title catalog, and applies filter and
//!   sort parameters.
//! - [`scanner`] reads file facts from the photo folder.
//! - [`upload`] validates and stores new photos from capture clients.
//!
//! Nothing here is async; callers on a runtime should run listings and
//! uploads on a blocking thread.
#![allow(missing_docs)]

pub mod clock;
pub mod error;
pub mod gallery;
pub mod naming;
pub mod scanner;
pub mod service;
pub mod upload;

pub use aerocam_model::{
    CaptureSource, CatalogEntry, FileFact, GalleryListing, GalleryQuery, PhotoRecord,
    SortBy, SortOrder, TitleCatalog, TitleKey,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{GalleryError, Result};
pub use gallery::{GalleryAssembler, GalleryOptions};
pub use naming::{Convention, MetadataExtractor, NamingOptions, TitleMatch};
pub use scanner::PhotoDirectory;
pub use service::GalleryService;
pub use upload::{
    PhotoInbox, StoredUpload, UploadBuffer, UploadPolicy, UploadRejection, UploadSubmission,
    UploadedFile, detect_image_mime, sanitize_filename,
};
