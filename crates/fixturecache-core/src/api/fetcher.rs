use std::future::Future;

use anyhow::Result;

use crate::coordinator::ResourceKey;
use crate::models::Resource;

/// Performs the network call and deserialization for one resource key.
///
/// Clones must be cheap: the repository clones the fetcher into every
/// spawned fetch.
pub trait RemoteFetcher: Clone + Send + Sync + 'static {
    fn fetch<T: Resource>(&self, key: &ResourceKey) -> impl Future<Output = Result<Vec<T>>> + Send;
}
