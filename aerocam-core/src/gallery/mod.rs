//! Listing assembly: facts in, filtered and ordered records out.

pub mod filtering;
pub mod sorting;

use aerocam_model::{
    FileFact, GalleryListing, GalleryQuery, PhotoRecord, TitleCatalog,
    photo::size_kb_from_bytes,
};
use tracing::{debug, info};

use crate::naming::MetadataExtractor;

pub use filtering::{matches_filter, resolve_filter};
pub use sorting::{compare_photos, sort_photos};

pub const DEFAULT_URL_PREFIX: &str = "foto/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryOptions {
    /// Prepended to the percent-encoded filename to form each record's URL.
    pub url_prefix: String,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GalleryAssembler {
    extractor: MetadataExtractor,
    options: GalleryOptions,
}

impl GalleryAssembler {
    pub fn new(extractor: MetadataExtractor, options: GalleryOptions) -> Self {
        Self { extractor, options }
    }

    pub fn extractor(&self) -> &MetadataExtractor {
        &self.extractor
    }

    pub fn options(&self) -> &GalleryOptions {
        &self.options
    }

    /// Build the listing for one request. Pure: the same facts and query
    /// always give the same listing.
    pub fn assemble(&self, facts: &[FileFact], query: &GalleryQuery) -> GalleryListing {
        let mut catalog = TitleCatalog::new();
        let mut photos: Vec<PhotoRecord> = facts
            .iter()
            .map(|fact| self.build_record(fact, &mut catalog))
            .collect();

        let filter = resolve_filter(&query.filter, &catalog, &self.extractor);
        photos.retain(|photo| matches_filter(photo, &filter));
        sort_photos(&mut photos, query.sort, query.order);

        let total_photos = photos.len();
        info!(
            "Assembled listing: {} of {} photos, {} titles (filter: {:?}, sort: {} {})",
            total_photos,
            facts.len(),
            catalog.len(),
            filter.as_str(),
            query.sort,
            query.order
        );

        GalleryListing {
            photos,
            catalog,
            total_photos,
            filter,
            sort: query.sort,
            order: query.order,
        }
    }

    /// Every title in `facts`, regardless of any filter.
    pub fn catalog(&self, facts: &[FileFact]) -> TitleCatalog {
        let mut catalog = TitleCatalog::new();
        for fact in facts {
            let found = self.extractor.match_title(&fact.filename);
            let canonical = found.is_canonical();
            catalog.insert(found.key, &found.title, canonical);
        }
        catalog
    }

    fn build_record(&self, fact: &FileFact, catalog: &mut TitleCatalog) -> PhotoRecord {
        let found = self.extractor.match_title(&fact.filename);
        let canonical = found.is_canonical();
        catalog.insert(found.key.clone(), &found.title, canonical);

        let captured = self
            .extractor
            .capture_time(&fact.filename, fact.modified_unix);
        debug!(
            "{}: title {:?}, captured {} from {}",
            fact.filename, found.title, captured.timestamp, captured.source
        );

        PhotoRecord {
            url: format!(
                "{}{}",
                self.options.url_prefix,
                urlencoding::encode(&fact.filename)
            ),
            filename: fact.filename.clone(),
            title: found.title,
            title_key: found.key,
            owner_id: found.owner_id,
            size_kb: size_kb_from_bytes(fact.size_bytes),
            captured_at: captured.timestamp,
            captured_from: captured.source,
            captured_label: self.extractor.format_timestamp(captured.timestamp),
        }
    }
}
