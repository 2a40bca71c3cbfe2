use chrono::{Duration, NaiveDateTime};

use super::filter::{event_instant, MalformedEntityError};
use crate::models::Game;

/// How long after kickoff a match is still shown as the next fixture.
/// Two hours covers ninety minutes plus half-time and stoppage.
pub const NEXT_FIXTURE_GRACE_MINUTES: i64 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingFixture {
    pub game: Game,
    /// Time until kickoff; negative while the match is in progress
    pub until_kickoff: Duration,
}

impl UpcomingFixture {
    pub fn has_started(&self) -> bool {
        self.until_kickoff <= Duration::zero()
    }
}

/// First fixture in list order that kicked off less than the grace period
/// ago (or has not kicked off yet).
pub fn next_fixture(
    events: &[Game],
    now: NaiveDateTime,
) -> Result<Option<UpcomingFixture>, MalformedEntityError> {
    let grace = Duration::minutes(-NEXT_FIXTURE_GRACE_MINUTES);
    for game in events {
        let until_kickoff = event_instant(game)? - now;
        if until_kickoff > grace {
            return Ok(Some(UpcomingFixture {
                game: game.clone(),
                until_kickoff,
            }));
        }
    }
    Ok(None)
}
