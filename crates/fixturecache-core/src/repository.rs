//! Composition root for data access.
//!
//! `Repository` owns the shared cache, one `FetchCoordinator` per category,
//! the remote fetcher and the settings provider. It is built once at
//! startup and passed by reference to whatever needs data.

use std::sync::Arc;

use tracing::debug;

use crate::api::RemoteFetcher;
use crate::cache::ResourceCache;
use crate::coordinator::{FetchCoordinator, FetchError, ResourceKey};
use crate::models::{EpicGame, Game, Race, Resource};
use crate::schedule::{self, Clock, SystemClock, UpcomingFixture};
use crate::settings::SettingsProvider;

pub struct Repository<R: RemoteFetcher, S: SettingsProvider> {
    api: R,
    settings: S,
    base_url: String,
    cache: Arc<ResourceCache>,
    clock: Arc<dyn Clock>,
    football: FetchCoordinator<Game>,
    races: FetchCoordinator<Race>,
    epic_games: FetchCoordinator<EpicGame>,
}

impl<R: RemoteFetcher, S: SettingsProvider> Repository<R, S> {
    pub fn new(api: R, settings: S, cache: ResourceCache, base_url: impl Into<String>) -> Self {
        Self::with_clock(api, settings, cache, base_url, Arc::new(SystemClock))
    }

    pub fn with_clock(
        api: R,
        settings: S,
        cache: ResourceCache,
        base_url: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(cache);
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            football: FetchCoordinator::new(Arc::clone(&cache), Arc::clone(&clock)),
            races: FetchCoordinator::new(Arc::clone(&cache), Arc::clone(&clock)),
            epic_games: FetchCoordinator::new(Arc::clone(&cache), Arc::clone(&clock)),
            api,
            settings,
            base_url,
            cache,
            clock,
        }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn team(&self) -> String {
        self.settings.team()
    }

    // ===== Resource Keys =====

    pub fn football_key(&self) -> ResourceKey {
        ResourceKey::new(format!("{}/api/football/{}", self.base_url, self.settings.team()))
    }

    pub fn races_key(&self) -> ResourceKey {
        ResourceKey::new(format!("{}/api/f1", self.base_url))
    }

    pub fn epic_games_key(&self) -> ResourceKey {
        ResourceKey::new(format!("{}/api/epic_games", self.base_url))
    }

    // ===== Loading =====

    async fn load<T: Resource>(
        &self,
        coordinator: &FetchCoordinator<T>,
        key: ResourceKey,
    ) -> Result<Vec<T>, FetchError> {
        let api = self.api.clone();
        let fetch_key = key.clone();
        coordinator
            .request(key, move || async move { api.fetch::<T>(&fetch_key).await })
            .await
    }

    /// Upcoming fixtures for the selected team, already stripped of
    /// matches that kicked off before the list was fetched.
    pub async fn load_football_games(&self) -> Result<Vec<Game>, FetchError> {
        self.load(&self.football, self.football_key()).await
    }

    pub async fn load_races(&self) -> Result<Vec<Race>, FetchError> {
        self.load(&self.races, self.races_key()).await
    }

    /// Races held in `country`, matched case-insensitively against the
    /// full race calendar.
    pub async fn load_races_in(&self, country: &str) -> Result<Vec<Race>, FetchError> {
        let races = self.load_races().await?;
        Ok(races.into_iter().filter(|r| r.is_in_country(country)).collect())
    }

    pub async fn load_epic_games(&self) -> Result<Vec<EpicGame>, FetchError> {
        self.load(&self.epic_games, self.epic_games_key()).await
    }

    /// The fixture to count down to, allowing a match in progress to stay
    /// current for the grace period after kickoff.
    pub async fn next_fixture(&self) -> Result<Option<UpcomingFixture>, FetchError> {
        let games = self.load_football_games().await?;
        let Some(now) = self.clock.local_now() else {
            debug!("Local time unavailable, no next fixture");
            return Ok(None);
        };
        Ok(schedule::next_fixture(&games, now)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
