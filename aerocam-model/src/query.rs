//! Listing parameters.
//!
//! Parsing is strict ([`std::str::FromStr`]) for callers that want to know
//! about bad input, while [`GalleryQuery::from_params`] is the lenient
//! request-facing constructor: anything unrecognized silently becomes the
//! default (`filter=""`, `sort=date`, `order=desc`).

use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Fields available for sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortBy {
    /// Capture timestamp.
    #[default]
    Date,
    /// Filename, byte order.
    Name,
    /// Rounded size in KiB.
    Size,
}

impl SortBy {
    pub fn all() -> &'static [SortBy] {
        &[SortBy::Date, SortBy::Name, SortBy::Size]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Date => "date",
            SortBy::Name => "name",
            SortBy::Size => "size",
        }
    }

    /// Lenient parse: missing or unknown values become the default.
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for SortBy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortBy::Date),
            "name" => Ok(SortBy::Name),
            "size" => Ok(SortBy::Size),
            _ => Err(ModelError::UnknownSortField(s.to_string())),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok()).unwrap_or_default()
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, SortOrder::Desc)
    }
}

impl FromStr for SortOrder {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ModelError::UnknownSortOrder(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable listing request.
///
/// `filter` holds the caller's raw text (trimmed). It is resolved against the
/// title catalog by the assembler, because whether a value is a known title
/// can only be decided once the whole folder has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GalleryQuery {
    pub filter: String,
    pub sort: SortBy,
    pub order: SortOrder,
}

impl GalleryQuery {
    pub fn new(filter: impl Into<String>, sort: SortBy, order: SortOrder) -> Self {
        Self {
            filter: filter.into().trim().to_string(),
            sort,
            order,
        }
    }

    pub fn from_params(
        filter: Option<&str>,
        sort: Option<&str>,
        order: Option<&str>,
    ) -> Self {
        Self::new(
            filter.unwrap_or_default(),
            SortBy::from_param(sort),
            SortOrder::from_param(order),
        )
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into().trim().to_string();
        self
    }

    pub fn sorted(mut self, sort: SortBy, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }
}
