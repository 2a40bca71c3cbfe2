use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};

use crate::models::Category;

/// Raw persistence for serialized cache entries, one slot per category.
pub trait LocalStore: Send + Sync {
    fn read(&self, category: Category) -> Result<Option<String>>;
    fn write(&self, category: Category, contents: &str) -> Result<()>;
    fn remove(&self, category: Category) -> Result<()>;
}

/// JSON files in a cache directory, `<cache_dir>/<name>.json`.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, category: Category) -> PathBuf {
        self.cache_dir.join(format!("{}.json", category.cache_name()))
    }
}

impl LocalStore for FileStore {
    fn read(&self, category: Category) -> Result<Option<String>> {
        let path = self.cache_path(category);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", category.cache_name()))?;
        Ok(Some(contents))
    }

    fn write(&self, category: Category, contents: &str) -> Result<()> {
        std::fs::write(self.cache_path(category), contents)
            .with_context(|| format!("Failed to write cache file: {}", category.cache_name()))
    }

    fn remove(&self, category: Category) -> Result<()> {
        let path = self.cache_path(category);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Process-local store; contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<Category, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Category, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl LocalStore for MemoryStore {
    fn read(&self, category: Category) -> Result<Option<String>> {
        Ok(self.entries()?.get(&category).cloned())
    }

    fn write(&self, category: Category, contents: &str) -> Result<()> {
        self.entries()?.insert(category, contents.to_string());
        Ok(())
    }

    fn remove(&self, category: Category) -> Result<()> {
        self.entries()?.remove(&category);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache")).unwrap();

        assert!(store.read(Category::Races).unwrap().is_none());
        store.write(Category::Races, "{\"a\":1}").unwrap();
        assert_eq!(store.read(Category::Races).unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.path().join("cache").join("races.json").exists());

        store.remove(Category::Races).unwrap();
        assert!(store.read(Category::Races).unwrap().is_none());
        // Removing a missing entry is fine
        store.remove(Category::Races).unwrap();
    }

    #[test]
    fn test_memory_store_categories_are_independent() {
        let store = MemoryStore::new();
        store.write(Category::Football, "football").unwrap();
        assert!(store.read(Category::EpicGames).unwrap().is_none());
        assert_eq!(store.read(Category::Football).unwrap().as_deref(), Some("football"));
    }
}
