use crate::domain::{ApplicationDraft, DraftPatch};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const DRAFT_KEY: &str = "loan_form_data";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String key/value storage local to this machine.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per entry inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage. Clones share the same entries, so a store rebuilt from
/// a clone sees what the previous one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a usable map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// The single source of truth for the application draft, written through to
/// storage on every change.
pub struct DraftStore {
    storage: Box<dyn KeyValueStore>,
    draft: ApplicationDraft,
}

impl DraftStore {
    /// Rehydrates the draft. Missing or unreadable data yields the default draft.
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        let draft = match storage.read(DRAFT_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<ApplicationDraft>(&json) {
                Ok(draft) => draft,
                Err(e) => {
                    tracing::warn!(error = %e, "persisted draft is corrupt, starting fresh");
                    ApplicationDraft::default()
                }
            },
            Ok(None) => ApplicationDraft::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted draft, starting fresh");
                ApplicationDraft::default()
            }
        };
        Self { storage, draft }
    }

    pub fn get(&self) -> &ApplicationDraft {
        &self.draft
    }

    /// Applies the patch in memory, then persists the merged draft. The
    /// in-memory draft keeps the new values even when the write fails.
    pub fn merge(&mut self, patch: DraftPatch) -> Result<(), StoreError> {
        self.draft.apply(patch);
        let json = serde_json::to_string(&self.draft)?;
        self.storage.write(DRAFT_KEY, &json)
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.draft = ApplicationDraft::default();
        self.storage.remove(DRAFT_KEY)
    }
}

impl std::fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore").field("draft", &self.draft).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;
    use tempfile::tempdir;

    fn personal_patch() -> DraftPatch {
        DraftPatch {
            phone: Some("5551234567".to_string()),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            gender: Some(Gender::Female),
            ..DraftPatch::default()
        }
    }

    #[test]
    fn test_open_empty_storage_gives_defaults() {
        let store = DraftStore::open(Box::new(MemoryStore::new()));
        assert_eq!(store.get(), &ApplicationDraft::default());
    }

    #[test]
    fn test_merge_accumulates_and_overwrites() {
        let mut store = DraftStore::open(Box::new(MemoryStore::new()));
        store.merge(personal_patch()).unwrap();
        assert_eq!(store.get().first_name, "Jane");

        store
            .merge(DraftPatch {
                first_name: Some("Janet".to_string()),
                amount: Some(700),
                ..DraftPatch::default()
            })
            .unwrap();

        let draft = store.get();
        assert_eq!(draft.first_name, "Janet");
        assert_eq!(draft.last_name, "Doe");
        assert_eq!(draft.gender, Some(Gender::Female));
        assert_eq!(draft.amount, 700);
        assert_eq!(draft.term, 10);
    }

    #[test]
    fn test_merge_persists_post_merge_draft() {
        let storage = MemoryStore::new();
        let mut store = DraftStore::open(Box::new(storage.clone()));
        store.merge(personal_patch()).unwrap();

        let reloaded = DraftStore::open(Box::new(storage));
        assert_eq!(reloaded.get(), store.get());
        assert_eq!(reloaded.get().first_name, "Jane");
    }

    #[test]
    fn test_reload_round_trip_without_merge() {
        let storage = MemoryStore::new();
        let mut store = DraftStore::open(Box::new(storage.clone()));
        store.merge(personal_patch()).unwrap();
        let before = store.get().clone();
        drop(store);

        let first = DraftStore::open(Box::new(storage.clone()));
        let second = DraftStore::open(Box::new(storage));
        assert_eq!(first.get(), &before);
        assert_eq!(second.get(), &before);
    }

    #[test]
    fn test_reset_restores_defaults_and_removes_entry() {
        let storage = MemoryStore::new();
        let mut store = DraftStore::open(Box::new(storage.clone()));
        store.merge(personal_patch()).unwrap();
        store.reset().unwrap();

        assert_eq!(store.get(), &ApplicationDraft::default());
        assert_eq!(storage.read(DRAFT_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_entry_falls_back_to_defaults() {
        let mut storage = MemoryStore::new();
        storage.write(DRAFT_KEY, "{not json").unwrap();

        let store = DraftStore::open(Box::new(storage));
        assert_eq!(store.get(), &ApplicationDraft::default());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let mut files = FileStore::new(dir.path().join("data"));
        assert_eq!(files.read("missing").unwrap(), None);

        files.write("greeting", "\"hello\"").unwrap();
        assert_eq!(files.read("greeting").unwrap().as_deref(), Some("\"hello\""));
        assert!(dir.path().join("data").join("greeting.json").exists());

        files.remove("greeting").unwrap();
        files.remove("greeting").unwrap();
        assert_eq!(files.read("greeting").unwrap(), None);
    }

    #[test]
    fn test_draft_store_on_disk_survives_reopen() {
        let dir = tempdir().unwrap();
        let mut store = DraftStore::open(Box::new(FileStore::new(dir.path())));
        store.merge(personal_patch()).unwrap();

        let reopened = DraftStore::open(Box::new(FileStore::new(dir.path())));
        assert_eq!(reopened.get().last_name, "Doe");
    }
}
