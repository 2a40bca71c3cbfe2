use chrono::NaiveDateTime;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::schedule::MalformedEntityError;

/// Resource kinds held by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub enum Category {
    Football,
    Races,
    EpicGames,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Football, Category::Races, Category::EpicGames];

    /// Key of the entity array in the API response body
    pub fn envelope_key(&self) -> &'static str {
        match self {
            Category::Football => "football",
            Category::Races => "races",
            Category::EpicGames => "epic_games",
        }
    }

    /// File stem used by the local store
    pub fn cache_name(&self) -> &'static str {
        match self {
            Category::Football => "football_games",
            Category::Races => "races",
            Category::EpicGames => "epic_games",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Football => write!(f, "Football"),
            Category::Races => write!(f, "Races"),
            Category::EpicGames => write!(f, "Epic Games"),
        }
    }
}

/// An entity type that can be fetched, cached and fanned out.
///
/// Each implementor belongs to exactly one [`Category`]. Categories whose
/// entities go stale override [`Resource::retain_current`].
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const CATEGORY: Category;

    /// Drop entities that should no longer be served, given local `now`
    /// (`None` when the platform cannot supply a wall-clock time).
    fn retain_current(
        items: Vec<Self>,
        _now: Option<NaiveDateTime>,
    ) -> Result<Vec<Self>, MalformedEntityError> {
        Ok(items)
    }
}
