//! Local caching module for offline data access.
//!
//! This module provides the `ResourceCache` holding the last fetched list
//! for each [`Category`](crate::models::Category), and the `LocalStore`
//! backends it persists through. Entries never expire on their own; a
//! successful fetch overwrites the whole entry.

pub mod manager;
pub mod store;

pub use manager::{CacheAges, CachedData, ResourceCache};
pub use store::{FileStore, LocalStore, MemoryStore};
