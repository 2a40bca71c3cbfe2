use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Category, Resource};
use crate::schedule::{self, MalformedEntityError};

/// A single football fixture for the selected team.
///
/// `date` is `YYYY-MM-DD` and `time` is `HH:MM` or `HH:MM:SS`, both in
/// local time. They stay as raw strings so a malformed value surfaces as a
/// [`MalformedEntityError`] when the fixture list is filtered, not as a
/// deserialization failure of the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Game {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub competition: Option<String>,
    #[serde(default)]
    pub opponent: Option<String>,
    #[serde(default)]
    pub stadium: Option<String>,
    /// Opponent crest, base64-encoded image bytes
    #[serde(default)]
    pub badge_base64: Option<String>,
}

impl Game {
    /// Kickoff as a naive local date-time
    pub fn kickoff(&self) -> Result<NaiveDateTime, MalformedEntityError> {
        schedule::event_instant(self)
    }

    pub fn formatted_date(&self) -> String {
        match self.kickoff() {
            Ok(dt) => dt.format("%a %b %d, %Y").to_string(),
            Err(_) => self.date.clone(),
        }
    }

    pub fn formatted_time(&self) -> String {
        match self.kickoff() {
            Ok(dt) => dt.format("%H:%M").to_string(),
            Err(_) => self.time.clone(),
        }
    }

    pub fn opponent_display(&self) -> &str {
        self.opponent.as_deref().unwrap_or("TBD")
    }
}

impl Resource for Game {
    const CATEGORY: Category = Category::Football;

    fn retain_current(
        items: Vec<Self>,
        now: Option<NaiveDateTime>,
    ) -> Result<Vec<Self>, MalformedEntityError> {
        schedule::filter(&items, now)
    }
}
