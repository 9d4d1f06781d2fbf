use std::collections::BTreeMap;

use crate::title_key::TitleKey;

/// A single filter-menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    pub key: TitleKey,
    pub title: String,
    /// Set when the title came from a fixed label table rather than being
    /// derived from free-form filename text.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub canonical: bool,
}

/// Every title discovered in the photo folder, keyed by [`TitleKey`].
///
/// Built from the unfiltered corpus so the filter menu always offers every
/// known title. The first title seen for a key wins unless a canonical title
/// arrives later, which replaces it; canonical titles are never replaced.
/// Iteration is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleCatalog {
    entries: BTreeMap<TitleKey, CatalogEntry>,
}

impl TitleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `title` under `key`. Returns `true` when the stored title
    /// changed.
    pub fn insert(&mut self, key: TitleKey, title: &str, canonical: bool) -> bool {
        match self.entries.get_mut(&key) {
            Some(existing) => {
                if canonical && !existing.canonical {
                    existing.title = title.to_string();
                    existing.canonical = true;
                    true
                } else {
                    false
                }
            }
            None => {
                self.entries.insert(
                    key.clone(),
                    CatalogEntry {
                        key,
                        title: title.to_string(),
                        canonical,
                    },
                );
                true
            }
        }
    }

    pub fn contains(&self, key: &TitleKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn title_for(&self, key: &TitleKey) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.title.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TitleKey> {
        self.entries.keys()
    }

    pub fn to_vec(&self) -> Vec<CatalogEntry> {
        self.entries.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> TitleKey {
        TitleKey::from_title(s)
    }

    #[test]
    fn first_free_form_title_wins() {
        let mut catalog = TitleCatalog::new();
        assert!(catalog.insert(key("Pak Tommy"), "Pak Tommy", false));
        assert!(!catalog.insert(key("pak TOMMY"), "Pak TOMMY", false));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.title_for(&key("pak tommy")), Some("Pak Tommy"));
    }

    #[test]
    fn canonical_title_replaces_derived_one() {
        let mut catalog = TitleCatalog::new();
        catalog.insert(key("PAK TOMMY"), "PAK TOMMY", false);
        assert!(catalog.insert(key("Pak Tommy"), "Pak Tommy", true));
        assert!(!catalog.insert(key("pak tommy"), "pak tommy", false));
        assert!(!catalog.insert(key("pak tommy"), "Pak tommy", true));
        assert_eq!(catalog.title_for(&key("pak tommy")), Some("Pak Tommy"));
    }

    #[test]
    fn iterates_in_key_order() {
        let mut catalog = TitleCatalog::new();
        catalog.insert(key("Zeta"), "Zeta", false);
        catalog.insert(key("Alpha"), "Alpha", false);
        catalog.insert(key("Mid"), "Mid", false);
        let keys: Vec<_> = catalog.keys().map(TitleKey::as_str).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }
}
