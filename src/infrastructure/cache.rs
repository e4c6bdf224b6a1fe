//! Workplace category cache kept next to the draft.
//!
//! The list and its fetch time live under two separate keys. An entry is
//! served while it is younger than the TTL; anything unreadable counts as a
//! miss so that the caller simply fetches again.

use super::persistence::{KeyValueStore, StoreError};

pub const CATEGORIES_KEY: &str = "workplace_categories";
pub const CATEGORIES_TIMESTAMP_KEY: &str = "workplace_categories_timestamp";
pub const DEFAULT_CATEGORY_TTL_MS: i64 = 3_600_000;

pub struct CategoryCatalog {
    storage: Box<dyn KeyValueStore>,
    ttl_ms: i64,
}

impl CategoryCatalog {
    pub fn new(storage: Box<dyn KeyValueStore>, ttl_ms: i64) -> Self {
        Self { storage, ttl_ms }
    }

    /// Returns the cached names if they were fetched less than one TTL ago.
    pub fn cached(&self, now_ms: i64) -> Option<Vec<String>> {
        let fetched_at = self
            .read_entry(CATEGORIES_TIMESTAMP_KEY)?
            .trim()
            .parse::<i64>()
            .ok()?;
        match now_ms.checked_sub(fetched_at) {
            Some(age_ms) if (0..self.ttl_ms).contains(&age_ms) => {}
            Some(age_ms) if age_ms >= self.ttl_ms => {
                tracing::debug!(age_ms, "category cache expired");
                return None;
            }
            _ => {
                tracing::warn!(fetched_at, now_ms, "category cache timestamp out of range");
                return None;
            }
        }

        let json = self.read_entry(CATEGORIES_KEY)?;
        match serde_json::from_str::<Vec<String>>(&json) {
            Ok(names) => Some(names),
            Err(e) => {
                tracing::warn!(error = %e, "cached categories are corrupt");
                None
            }
        }
    }

    pub fn record(&mut self, names: &[String], now_ms: i64) -> Result<(), StoreError> {
        let json = serde_json::to_string(names)?;
        self.storage.write(CATEGORIES_KEY, &json)?;
        self.storage
            .write(CATEGORIES_TIMESTAMP_KEY, &now_ms.to_string())
    }

    fn read_entry(&self, key: &str) -> Option<String> {
        match self.storage.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "could not read category cache");
                None
            }
        }
    }
}

impl std::fmt::Debug for CategoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryCatalog")
            .field("ttl_ms", &self.ttl_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::MemoryStore;

    fn names() -> Vec<String> {
        vec!["beauty".to_string(), "laptops".to_string()]
    }

    #[test]
    fn test_empty_cache_misses() {
        let catalog = CategoryCatalog::new(Box::new(MemoryStore::new()), DEFAULT_CATEGORY_TTL_MS);
        assert_eq!(catalog.cached(0), None);
    }

    #[test]
    fn test_fresh_entry_is_served_until_ttl() {
        let mut catalog =
            CategoryCatalog::new(Box::new(MemoryStore::new()), DEFAULT_CATEGORY_TTL_MS);
        catalog.record(&names(), 10_000).unwrap();

        assert_eq!(catalog.cached(10_000), Some(names()));
        assert_eq!(catalog.cached(10_000 + 3_599_999), Some(names()));
        assert_eq!(catalog.cached(10_000 + 3_600_000), None);
    }

    #[test]
    fn test_entries_shared_through_storage() {
        let storage = MemoryStore::new();
        let mut catalog = CategoryCatalog::new(Box::new(storage.clone()), 1_000);
        catalog.record(&names(), 0).unwrap();

        let other = CategoryCatalog::new(Box::new(storage), 1_000);
        assert_eq!(other.cached(500), Some(names()));
    }

    #[test]
    fn test_corrupt_entries_count_as_miss() {
        let mut storage = MemoryStore::new();
        storage.write(CATEGORIES_KEY, "[oops").unwrap();
        storage.write(CATEGORIES_TIMESTAMP_KEY, "0").unwrap();
        let catalog = CategoryCatalog::new(Box::new(storage.clone()), 1_000);
        assert_eq!(catalog.cached(10), None);

        storage.write(CATEGORIES_KEY, "[\"beauty\"]").unwrap();
        storage.write(CATEGORIES_TIMESTAMP_KEY, "yesterday").unwrap();
        assert_eq!(catalog.cached(10), None);

        storage
            .write(CATEGORIES_TIMESTAMP_KEY, &i64::MIN.to_string())
            .unwrap();
        assert_eq!(catalog.cached(1_700_000_000_000), None);

        storage.write(CATEGORIES_TIMESTAMP_KEY, "500").unwrap();
        assert_eq!(catalog.cached(10), None);
        assert_eq!(catalog.cached(500), Some(vec!["beauty".to_string()]));
    }
}
