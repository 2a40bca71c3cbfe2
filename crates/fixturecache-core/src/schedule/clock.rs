use chrono::{Local, NaiveDateTime};

/// Source of the current local wall-clock time.
///
/// `local_now` returns `None` when the platform cannot produce a time at
/// all; callers treat that as "every fixture has expired".
pub trait Clock: Send + Sync {
    fn local_now(&self) -> Option<NaiveDateTime>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_now(&self) -> Option<NaiveDateTime> {
        Some(Local::now().naive_local())
    }
}

/// Clock pinned to a fixed instant (or to "unavailable").
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Option<NaiveDateTime>);

impl FixedClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self(Some(now))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl Clock for FixedClock {
    fn local_now(&self) -> Option<NaiveDateTime> {
        self.0
    }
}
