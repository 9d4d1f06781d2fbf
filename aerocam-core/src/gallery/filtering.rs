use aerocam_model::{PhotoRecord, TitleCatalog, TitleKey};
use tracing::debug;

use crate::naming::MetadataExtractor;

/// Turn the caller's raw filter text into the key actually applied.
///
/// Bare numeric ids resolve through the label table when the numeric
/// convention is active. Anything that does not name a catalog entry becomes
/// the empty filter.
pub fn resolve_filter(
    raw: &str,
    catalog: &TitleCatalog,
    extractor: &MetadataExtractor,
) -> TitleKey {
    let raw = raw.trim();
    if raw.is_empty() {
        return TitleKey::empty();
    }

    let key = match extractor.numeric_label(raw) {
        Some(label) => TitleKey::from_title(label),
        None => TitleKey::from_title(raw),
    };

    if catalog.contains(&key) {
        key
    } else {
        debug!("Ignoring unknown filter {:?}", raw);
        TitleKey::empty()
    }
}

/// Exact key match; the empty filter keeps everything.
pub fn matches_filter(photo: &PhotoRecord, filter: &TitleKey) -> bool {
    filter.is_empty() || photo.title_key == *filter
}
