use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::IgnoredAny, Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::{LocalStore, MemoryStore};
use crate::models::{Category, Resource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative age)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                // Round up: 1d 12h+ becomes 2d
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Last fetched entity list per category.
///
/// No TTL and no eviction: an entry stays authoritative until the next
/// successful fetch for its category replaces it. Unreadable entries are
/// logged and treated as absent.
pub struct ResourceCache {
    store: Box<dyn LocalStore>,
}

impl ResourceCache {
    pub fn new(store: impl LocalStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    fn load<T: for<'de> Deserialize<'de>>(&self, category: Category) -> Result<Option<CachedData<T>>> {
        let Some(contents) = self.store.read(category)? else {
            return Ok(None);
        };
        let cached = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}", category.cache_name()))?;
        Ok(Some(cached))
    }

    pub fn get<T: Resource>(&self) -> Option<CachedData<Vec<T>>> {
        match self.load(T::CATEGORY) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(category = %T::CATEGORY, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    /// Replace the entry for `T::CATEGORY` with `items`.
    pub fn set<T: Resource>(&self, items: &[T]) -> Result<()> {
        let cached = CachedData::new(items);
        let contents = serde_json::to_string_pretty(&cached)?;
        self.store.write(T::CATEGORY, &contents)?;
        debug!(category = %T::CATEGORY, count = items.len(), "Cache entry written");
        Ok(())
    }

    /// A hit requires a non-empty entry.
    pub fn is_present<T: Resource>(&self) -> bool {
        self.get::<T>().is_some_and(|cached| !cached.data.is_empty())
    }

    /// Drop the entry for `T::CATEGORY` so the next request fetches.
    pub fn remove<T: Resource>(&self) -> Result<()> {
        self.store.remove(T::CATEGORY)
    }

    pub fn clear(&self) -> Result<()> {
        for category in Category::ALL {
            self.store.remove(category)?;
        }
        Ok(())
    }

    /// Helper to load an entry's age and log errors without failing
    fn load_age(&self, category: Category) -> Option<String> {
        match self.load::<IgnoredAny>(category) {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(category = %category, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }

    pub fn ages(&self) -> CacheAges {
        CacheAges {
            football: self.load_age(Category::Football),
            races: self.load_age(Category::Races),
            epic_games: self.load_age(Category::EpicGames),
        }
    }
}

#[derive(Debug, Default)]
pub struct CacheAges {
    pub football: Option<String>,
    pub races: Option<String>,
    pub epic_games: Option<String>,
}

impl CacheAges {
    pub fn get(&self, category: Category) -> String {
        let age = match category {
            Category::Football => &self.football,
            Category::Races => &self.races,
            Category::EpicGames => &self.epic_games,
        };
        age.clone().unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
