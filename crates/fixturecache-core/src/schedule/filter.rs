use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Game;

/// A fixture whose date or kickoff time cannot be turned into an instant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fixture {id} has invalid {field}: {value:?}")]
pub struct MalformedEntityError {
    pub id: i64,
    pub field: &'static str,
    pub value: String,
}

impl MalformedEntityError {
    fn new(game: &Game, field: &'static str, value: &str) -> Self {
        Self {
            id: game.id,
            field,
            value: value.to_string(),
        }
    }
}

/// Parse `YYYY-MM-DD`. Components past the day are ignored.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse `HH:MM[:SS]`. Hours and minutes are required; seconds default to 0
/// when missing or unreadable.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    let mut parts = raw.split(':');
    let hours = parts.next()?.parse::<u32>().ok()?;
    let minutes = parts.next()?.parse::<u32>().ok()?;
    let seconds = parts
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0);
    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

/// Kickoff of `game` as a naive local date-time.
pub fn event_instant(game: &Game) -> Result<NaiveDateTime, MalformedEntityError> {
    let date =
        parse_date(&game.date).ok_or_else(|| MalformedEntityError::new(game, "date", &game.date))?;
    let time =
        parse_time(&game.time).ok_or_else(|| MalformedEntityError::new(game, "time", &game.time))?;
    Ok(date.and_time(time))
}

/// Keep only fixtures that kick off strictly after `now`, preserving order.
///
/// Every fixture is parsed before anything is dropped, so one malformed
/// entry fails the whole list. When `now` is `None` the result is empty.
pub fn filter(events: &[Game], now: Option<NaiveDateTime>) -> Result<Vec<Game>, MalformedEntityError> {
    let kickoffs = events
        .iter()
        .map(event_instant)
        .collect::<Result<Vec<_>, _>>()?;

    let Some(now) = now else {
        warn!(
            count = events.len(),
            "Local time unavailable, treating all fixtures as expired"
        );
        return Ok(Vec::new());
    };

    let kept: Vec<Game> = events
        .iter()
        .zip(kickoffs)
        .filter(|(_, kickoff)| *kickoff - now > Duration::zero())
        .map(|(game, _)| game.clone())
        .collect();

    debug!(
        kept = kept.len(),
        dropped = events.len() - kept.len(),
        "Filtered expired fixtures"
    );
    Ok(kept)
}
