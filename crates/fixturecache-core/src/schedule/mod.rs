//! Fixture timing: expiry filtering and next-fixture selection.
//!
//! Fixtures are filtered once when a fetch completes, so the cached list
//! never contains matches that have already kicked off. All instants are
//! naive local date-times, matching how the API publishes kickoff times.

pub mod clock;
pub mod filter;
pub mod upcoming;

pub use clock::{Clock, FixedClock, SystemClock};
pub use filter::{event_instant, filter, MalformedEntityError};
pub use upcoming::{next_fixture, UpcomingFixture, NEXT_FIXTURE_GRACE_MINUTES};
