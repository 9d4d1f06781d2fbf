use std::cmp::Ordering;

use aerocam_model::{PhotoRecord, SortBy, SortOrder};

/// Ascending order is the primary key, then filename. Descending is the
/// exact reverse, so flipping `order` always reverses the listing.
pub fn compare_photos(
    a: &PhotoRecord,
    b: &PhotoRecord,
    sort_by: SortBy,
    order: SortOrder,
) -> Ordering {
    let primary = match sort_by {
        SortBy::Date => a.captured_at.cmp(&b.captured_at),
        SortBy::Name => a.filename.cmp(&b.filename),
        SortBy::Size => a.size_kb.cmp(&b.size_kb),
    };
    let ordering = primary.then_with(|| a.filename.cmp(&b.filename));

    if order.is_descending() {
        ordering.reverse()
    } else {
        ordering
    }
}

pub fn sort_photos(photos: &mut [PhotoRecord], sort_by: SortBy, order: SortOrder) {
    photos.sort_by(|a, b| compare_photos(a, b, sort_by, order));
}
