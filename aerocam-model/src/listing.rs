use crate::{
    catalog::TitleCatalog,
    photo::PhotoRecord,
    query::{SortBy, SortOrder},
    title_key::TitleKey,
};

/// Result of one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryListing {
    /// Filtered and ordered records.
    pub photos: Vec<PhotoRecord>,
    /// Every title in the folder, independent of `filter`.
    pub catalog: TitleCatalog,
    /// Always `photos.len()`.
    pub total_photos: usize,
    /// The filter actually applied; empty when everything is shown.
    pub filter: TitleKey,
    pub sort: SortBy,
    pub order: SortOrder,
}

impl GalleryListing {
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn is_filtered(&self) -> bool {
        !self.filter.is_empty()
    }

    /// Display title of the active filter, if any.
    pub fn filter_title(&self) -> Option<&str> {
        if self.filter.is_empty() {
            None
        } else {
            self.catalog.title_for(&self.filter)
        }
    }
}
