//! REST API client module for the fixtures service.
//!
//! This module provides the `RemoteFetcher` seam the coordinator fetches
//! through, and `ApiClient`, its HTTP implementation. Every endpoint
//! answers with a JSON object wrapping the entity list under a
//! category-specific key (`football`, `races`, `epic_games`).
//!
//! Requests carry an optional bearer token. There are no retries: a failed
//! request fails the whole fetch wave.

pub mod client;
pub mod error;
pub mod fetcher;

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
pub use error::ApiError;
pub use fetcher::RemoteFetcher;
