//! Local fallback cache for category preferences.
//!
//! The cache holds one named entry: the serialized preference list produced
//! by the last reconciliation. It is read when the remote set is empty or
//! unreachable and rewritten after every reconciliation.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

use crate::{StoreError, StoreResult, UserCategoryPreference};

/// Name of the cache entry holding the preference list.
pub const PREFERENCES_ENTRY: &str = "userCategoryPreferences";

pub trait PreferenceCache {
    fn read(&self) -> StoreResult<Vec<UserCategoryPreference>>;
    fn write(&self, preferences: &[UserCategoryPreference]) -> StoreResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: BTreeMap<String, serde_json::Value>,
}

/// JSON file on disk; other entries in the same file are preserved.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<CacheFile> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CacheFile::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }
}

impl PreferenceCache for FileCache {
    fn read(&self) -> StoreResult<Vec<UserCategoryPreference>> {
        match self.load()?.entries.remove(PREFERENCES_ENTRY) {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    fn write(&self, preferences: &[UserCategoryPreference]) -> StoreResult<()> {
        let mut file = self.load()?;
        file.entries.insert(
            PREFERENCES_ENTRY.to_string(),
            serde_json::to_value(preferences)?,
        );
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

/// In-process cache. Clones share the same entry.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entry: Arc<Mutex<Vec<UserCategoryPreference>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(preferences: Vec<UserCategoryPreference>) -> Self {
        Self {
            entry: Arc::new(Mutex::new(preferences)),
        }
    }
}

impl PreferenceCache for MemoryCache {
    fn read(&self) -> StoreResult<Vec<UserCategoryPreference>> {
        self.entry
            .lock()
            .map(|entry| entry.clone())
            .map_err(|_| StoreError::Cache("memory cache poisoned".to_string()))
    }

    fn write(&self, preferences: &[UserCategoryPreference]) -> StoreResult<()> {
        let mut entry = self
            .entry
            .lock()
            .map_err(|_| StoreError::Cache("memory cache poisoned".to_string()))?;
        *entry = preferences.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn preference(enabled: bool) -> UserCategoryPreference {
        UserCategoryPreference {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            category_id: Uuid::new_v4(),
            enabled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join("pawledger-tests")
            .join(format!("cache_{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_reads_empty() {
        let cache = FileCache::new(temp_path());
        assert!(cache.read().unwrap().is_empty());
    }

    #[test]
    fn file_cache_round_trips_and_keeps_other_entries() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"entries":{"theme":"dark"}}"#).unwrap();

        let cache = FileCache::new(&path);
        let stored = vec![preference(true), preference(false)];
        cache.write(&stored).unwrap();

        assert_eq!(cache.read().unwrap(), stored);
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["entries"]["theme"], "dark");
        assert_eq!(raw["entries"][PREFERENCES_ENTRY][0]["categoryId"], stored[0].category_id.to_string());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn memory_cache_clones_share_the_entry() {
        let cache = MemoryCache::new();
        let view = cache.clone();
        cache.write(&[preference(true)]).unwrap();
        assert_eq!(view.read().unwrap().len(), 1);
    }
}
