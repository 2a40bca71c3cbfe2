//! API token storage in the OS keychain.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "fixturecache";

/// Keychain account the bearer token is stored under
const TOKEN_ACCOUNT: &str = "api-token";

pub struct CredentialStore;

impl CredentialStore {
    fn entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, TOKEN_ACCOUNT).context("Failed to create keyring entry")
    }

    /// Store the API token in the OS keychain
    pub fn store_token(token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    /// Retrieve the API token from the OS keychain
    pub fn token() -> Result<String> {
        Self::entry()?
            .get_password()
            .context("Failed to retrieve token from keychain")
    }

    /// Delete the stored token
    pub fn delete() -> Result<()> {
        Self::entry()?
            .delete_credential()
            .context("Failed to delete token from keychain")
    }

    pub fn has_token() -> bool {
        Self::token().is_ok()
    }
}
