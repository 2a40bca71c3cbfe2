//! User preference access.

/// Synchronous source of the user's selected team.
pub trait SettingsProvider: Send + Sync {
    /// Selected team, lowercased as the API expects it in paths
    fn team(&self) -> String;
}

/// Fixed team, for tests and one-off lookups.
#[derive(Debug, Clone)]
pub struct StaticTeam(pub String);

impl SettingsProvider for StaticTeam {
    fn team(&self) -> String {
        self.0.trim().to_lowercase()
    }
}
