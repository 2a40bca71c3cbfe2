use serde::{Deserialize, Serialize};

use super::{Category, Resource};

/// A free game currently (or soon) offered on the Epic Games Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct EpicGame {
    #[serde(default)]
    pub id: i64,
    #[serde(alias = "name", default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(alias = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(alias = "endDate", default)]
    pub end_date: Option<String>,
}

impl EpicGame {
    /// "until Jun 13" style availability label
    pub fn availability(&self) -> String {
        match &self.end_date {
            Some(end) => format!("until {}", crate::utils::format_date(end)),
            None => "available now".to_string(),
        }
    }
}

impl Resource for EpicGame {
    const CATEGORY: Category = Category::EpicGames;
}
