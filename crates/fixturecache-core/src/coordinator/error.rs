use thiserror::Error;

use crate::schedule::MalformedEntityError;

/// Outcome delivered to every waiter when a fetch wave fails.
///
/// `Clone` so a single failure can be fanned out to all queued requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Fetch failed: {0}")]
    Transport(String),

    #[error("Malformed data: {0}")]
    MalformedEntity(#[from] MalformedEntityError),

    #[error("Fetch aborted: {0}")]
    Aborted(String),
}

impl FetchError {
    /// Wrap a fetcher error, keeping the whole context chain
    pub fn transport(error: &anyhow::Error) -> Self {
        FetchError::Transport(format!("{:#}", error))
    }
}
