use std::fmt;

use crate::title_key::TitleKey;

/// Which fact produced [`PhotoRecord::captured_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CaptureSource {
    /// A `YYYY-MM-DD_HH-MM-SS` stamp embedded in the filename.
    Filename,
    /// The file's last-modified time.
    Modified,
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSource::Filename => f.write_str("filename"),
            CaptureSource::Modified => f.write_str("modified"),
        }
    }
}

/// One listed photo. Built fresh for every listing and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhotoRecord {
    /// On-disk basename, unique within a listing.
    pub filename: String,
    /// Human-readable owner/subject label; never empty.
    pub title: String,
    pub title_key: TitleKey,
    /// Legacy numeric owner id, present only when the numeric-id naming
    /// convention produced `title`.
    pub owner_id: Option<u8>,
    /// Size in KiB, rounded half-up.
    pub size_kb: u64,
    /// Unix timestamp of capture.
    pub captured_at: i64,
    pub captured_from: CaptureSource,
    /// `captured_at` rendered in the gallery timezone, e.g. `01 Jan 2025, 10:00`.
    pub captured_label: String,
    /// Relative URL for retrieval.
    pub url: String,
}

/// Round a byte count to whole KiB, half-up.
pub fn size_kb_from_bytes(size_bytes: u64) -> u64 {
    size_bytes.saturating_add(512) / 1024
}
