use std::fmt;

/// Normalized title used as the filter-menu key and for filter matching.
///
/// Always `trim(lowercase(title))`, so two titles that differ only in case or
/// surrounding whitespace collide to the same key. The empty key is reserved
/// for "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TitleKey(String);

impl TitleKey {
    pub fn from_title(title: &str) -> Self {
        Self(title.to_lowercase().trim().to_string())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TitleKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
