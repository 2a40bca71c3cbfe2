use serde::{Deserialize, Serialize};

use super::{Category, Resource};

/// One session on the F1 calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Race {
    #[serde(default)]
    pub id: i64,
    #[serde(alias = "race", alias = "session", default)]
    pub name: String,
    #[serde(default)]
    pub circuit: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    /// Track layout, base64-encoded image bytes
    #[serde(default)]
    pub track: Option<String>,
}

impl Race {
    pub fn location(&self) -> String {
        match (&self.circuit, &self.country) {
            (Some(circuit), Some(country)) => format!("{}, {}", circuit, country),
            (Some(circuit), None) => circuit.clone(),
            (None, Some(country)) => country.clone(),
            (None, None) => "TBD".to_string(),
        }
    }

    pub fn is_in_country(&self, country: &str) -> bool {
        self.country
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(country))
            .unwrap_or(false)
    }
}

impl Resource for Race {
    const CATEGORY: Category = Category::Races;
}
