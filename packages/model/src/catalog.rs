//! Theme catalog abstraction.
//!
//! Install-mode packaging checks for slug collisions here and publishes the
//! final artifact location as the last step of a successful install.

use blockpress_common::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// A published theme, looked up by slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub slug: String,
    pub name: String,
    pub version: String,
    pub location: PathBuf,
}

pub trait ThemeCatalog: Send + Sync {
    fn contains(&self, slug: &str) -> bool;

    /// Register a theme. Fails with `Conflict` if the slug is taken.
    fn register(&self, entry: CatalogEntry) -> Result<(), CoreError>;

    fn get(&self, slug: &str) -> Option<CatalogEntry>;
}

/// In-memory catalog for tests and embedded use.
#[derive(Default)]
pub struct MemoryCatalog {
    entries: Mutex<HashMap<String, CatalogEntry>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("catalog lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ThemeCatalog for MemoryCatalog {
    fn contains(&self, slug: &str) -> bool {
        self.entries
            .lock()
            .expect("catalog lock poisoned")
            .contains_key(slug)
    }

    fn register(&self, entry: CatalogEntry) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().expect("catalog lock poisoned");
        if entries.contains_key(&entry.slug) {
            return Err(CoreError::Conflict(entry.slug));
        }
        entries.insert(entry.slug.clone(), entry);
        Ok(())
    }

    fn get(&self, slug: &str) -> Option<CatalogEntry> {
        self.entries
            .lock()
            .expect("catalog lock poisoned")
            .get(slug)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str) -> CatalogEntry {
        CatalogEntry {
            slug: slug.to_string(),
            name: slug.to_string(),
            version: "1.0.0".to_string(),
            location: PathBuf::from(format!("/themes/{slug}")),
        }
    }

    #[test]
    fn register_and_lookup() {
        let catalog = MemoryCatalog::new();
        assert!(!catalog.contains("aurora"));

        catalog.register(entry("aurora")).unwrap();
        assert!(catalog.contains("aurora"));
        assert_eq!(catalog.get("aurora").unwrap().version, "1.0.0");
    }

    #[test]
    fn duplicate_slug_conflicts() {
        let catalog = MemoryCatalog::new();
        catalog.register(entry("aurora")).unwrap();

        let err = catalog.register(entry("aurora")).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(slug) if slug == "aurora"));
        assert_eq!(catalog.len(), 1);
    }
}
