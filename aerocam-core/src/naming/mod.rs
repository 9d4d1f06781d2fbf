//! Filename metadata extraction.
//!
//! Capture clients encode everything the gallery knows about a photo in its
//! name: who it belongs to and, usually, when it was taken. The extractor is
//! pure and never fails on odd names; anything it cannot read falls back to
//! the configured unknown label or to the file's modification time.

mod numeric;
mod timestamp;
mod title;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use aerocam_model::{CaptureSource, TitleKey};
use chrono::TimeZone;
use chrono_tz::Tz;
use tracing::debug;

use crate::error::Result;

pub use numeric::{default_numeric_labels, leading_owner_digit};
pub use timestamp::TimestampPattern;
pub use title::free_form_title;

/// Default gallery timezone. Capture clients stamp local wall-clock time.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Jakarta;
pub const DEFAULT_SEPARATOR: char = '_';
pub const DEFAULT_UNKNOWN_LABEL: &str = "Unknown";
/// Display format for `captured_label`, e.g. `01 Jan 2025, 10:00`.
pub const CAPTURE_LABEL_FORMAT: &str = "%d %b %Y, %H:%M";

/// A filename naming scheme that can yield a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convention {
    /// `1_...` / `2_...`: leading digit looked up in the numeric label table.
    NumericId,
    /// Text before the first separator, dashes read as spaces.
    FreeFormTitle,
}

impl Convention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Convention::NumericId => "numeric_id",
            Convention::FreeFormTitle => "free_form",
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownConvention(pub String);

impl fmt::Display for UnknownConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown naming convention '{}' (expected numeric_id or free_form)",
            self.0
        )
    }
}

impl std::error::Error for UnknownConvention {}

impl FromStr for Convention {
    type Err = UnknownConvention;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "numeric_id" | "numeric" => Ok(Convention::NumericId),
            "free_form" | "free_form_title" | "freeform" => {
                Ok(Convention::FreeFormTitle)
            }
            _ => Err(UnknownConvention(s.to_string())),
        }
    }
}

/// Deployment-level naming settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NamingOptions {
    pub separator: char,
    pub timezone: Tz,
    pub unknown_label: String,
    /// Tried in order; the first convention that yields a title wins.
    pub conventions: Vec<Convention>,
    pub numeric_labels: BTreeMap<u8, String>,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            timezone: DEFAULT_TIMEZONE,
            unknown_label: DEFAULT_UNKNOWN_LABEL.to_string(),
            conventions: vec![Convention::FreeFormTitle],
            numeric_labels: default_numeric_labels(),
        }
    }
}

impl NamingOptions {
    pub fn with_conventions(mut self, conventions: Vec<Convention>) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_unknown_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_label = label.into();
        self
    }

    pub fn with_numeric_labels(mut self, labels: BTreeMap<u8, String>) -> Self {
        self.numeric_labels = labels;
        self
    }

    pub fn uses(&self, convention: Convention) -> bool {
        self.conventions.contains(&convention)
    }
}

/// Title resolved for one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub title: String,
    pub key: TitleKey,
    pub owner_id: Option<u8>,
    /// Convention that produced `title`; `None` for the unknown label.
    pub convention: Option<Convention>,
}

impl TitleMatch {
    /// Titles from the numeric label table are authoritative for their key.
    pub fn is_canonical(&self) -> bool {
        matches!(self.convention, Some(Convention::NumericId))
    }
}

/// Resolved capture time and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTime {
    pub timestamp: i64,
    pub source: CaptureSource,
}

#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    options: NamingOptions,
    timestamps: TimestampPattern,
}

impl MetadataExtractor {
    pub fn new(options: NamingOptions) -> Result<Self> {
        let timestamps = TimestampPattern::new(options.separator, options.timezone)?;
        Ok(Self {
            options,
            timestamps,
        })
    }

    pub fn options(&self) -> &NamingOptions {
        &self.options
    }

    /// Display title for `filename`. Never empty.
    pub fn extract_title(&self, filename: &str) -> String {
        self.match_title(filename).title
    }

    /// Run the convention chain and fall back to the unknown label.
    pub fn match_title(&self, filename: &str) -> TitleMatch {
        for convention in &self.options.conventions {
            let found = match convention {
                Convention::NumericId => self
                    .legacy_owner_id(filename)
                    .and_then(|id| {
                        self.options
                            .numeric_labels
                            .get(&id)
                            .map(|label| (label.clone(), Some(id)))
                    }),
                Convention::FreeFormTitle => {
                    free_form_title(filename, self.options.separator)
                        .map(|title| (title, None))
                }
            };

            if let Some((title, owner_id)) = found {
                debug!("{:?} titled {:?} by {}", filename, title, convention);
                return TitleMatch {
                    key: TitleKey::from_title(&title),
                    title,
                    owner_id,
                    convention: Some(*convention),
                };
            }
        }

        debug!("{:?} matched no naming convention", filename);
        let title = self.options.unknown_label.clone();
        TitleMatch {
            key: TitleKey::from_title(&title),
            title,
            owner_id: None,
            convention: None,
        }
    }

    /// Owner id from a leading digit, only when the label table knows it.
    pub fn legacy_owner_id(&self, filename: &str) -> Option<u8> {
        leading_owner_digit(filename)
            .filter(|id| self.options.numeric_labels.contains_key(id))
    }

    /// Embedded capture time, else `fallback` (normally the mtime).
    pub fn extract_captured_at(&self, filename: &str, fallback: i64) -> i64 {
        self.capture_time(filename, fallback).timestamp
    }

    pub fn capture_time(&self, filename: &str, fallback: i64) -> CaptureTime {
        match self.timestamps.find(filename) {
            Some(timestamp) => CaptureTime {
                timestamp,
                source: CaptureSource::Filename,
            },
            None => CaptureTime {
                timestamp: fallback,
                source: CaptureSource::Modified,
            },
        }
    }

    /// Render a Unix timestamp in the gallery timezone.
    pub fn format_timestamp(&self, timestamp: i64) -> String {
        self.options
            .timezone
            .timestamp_opt(timestamp, 0)
            .single()
            .map(|instant| instant.format(CAPTURE_LABEL_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Label for a bare numeric filter value such as `"1"`, when the
    /// numeric convention is active.
    pub fn numeric_label(&self, raw: &str) -> Option<&str> {
        if !self.options.uses(Convention::NumericId) {
            return None;
        }
        let id: u8 = raw.trim().parse().ok()?;
        self.options.numeric_labels.get(&id).map(String::as_str)
    }
}

/// Stable filter key for a title.
pub fn title_key(title: &str) -> TitleKey {
    TitleKey::from_title(title)
}
