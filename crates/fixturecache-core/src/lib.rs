//! Core library for fixturecache.
//!
//! Coordinates access to the fixtures service: each category's last result
//! is cached locally, concurrent requests for the same resource share one
//! network call, and football fixtures that have already kicked off are
//! dropped before a fetched list is cached.
//!
//! - `repository`: The composition root callers load data through
//! - `coordinator`: Per-key fetch de-duplication and fan-out
//! - `cache`: Last-result cache and its local stores
//! - `schedule`: Fixture expiry filtering and next-fixture selection
//! - `api`: The remote fetcher seam and its HTTP client

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod credentials;
pub mod models;
pub mod repository;
pub mod schedule;
pub mod settings;
pub mod utils;

pub use api::{ApiClient, ApiError, RemoteFetcher};
pub use cache::{FileStore, MemoryStore, ResourceCache};
pub use config::Config;
pub use coordinator::{FetchCoordinator, FetchError, FetchState, ResourceKey};
pub use credentials::CredentialStore;
pub use models::{Category, EpicGame, Game, Race, Resource};
pub use repository::Repository;
pub use schedule::{Clock, SystemClock};
pub use settings::SettingsProvider;
