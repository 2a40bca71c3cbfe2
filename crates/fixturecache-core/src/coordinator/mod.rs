//! Fetch coordination with per-key de-duplication.
//!
//! The `FetchCoordinator` guarantees at most one in-flight fetch per
//! `ResourceKey`. Requests that arrive while a fetch is running are queued
//! and receive the same outcome, in arrival order, once it resolves.
//! Successful results are written to the shared `ResourceCache`; failures
//! are never cached.

pub mod error;
pub mod fetch;
pub mod key;

pub use error::FetchError;
pub use fetch::{FetchCoordinator, FetchState, Waiter};
pub use key::ResourceKey;
