use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

//
// ─── CLOCK ─────────────────────────────────────────────────────────────────────
//

/// Wall-clock source used to stamp session and feed instants.
///
/// `Fixed` keeps services and tests deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

//
// ─── ELAPSED TRACKING ──────────────────────────────────────────────────────────
//

/// Whole seconds elapsed since a session origin.
///
/// Observations never move the value backwards, and once frozen the value
/// no longer changes regardless of how much time passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedTracker {
    seconds: u64,
    frozen: bool,
}

impl ElapsedTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the time since origin, returning the updated value.
    ///
    /// Returns `None` once the tracker is frozen.
    pub fn observe(&mut self, since_origin: StdDuration) -> Option<u64> {
        if self.frozen {
            return None;
        }
        self.seconds = self.seconds.max(since_origin.as_secs());
        Some(self.seconds)
    }

    /// Take a final observation and stop accepting new ones.
    ///
    /// Calling this again returns the already-frozen value.
    pub fn freeze(&mut self, since_origin: StdDuration) -> u64 {
        if !self.frozen {
            self.seconds = self.seconds.max(since_origin.as_secs());
            self.frozen = true;
        }
        self.seconds
    }

    #[must_use]
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

//
// ─── FORMATTING ────────────────────────────────────────────────────────────────
//

/// Running-timer rendering, e.g. `4:07`.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Completion-time rendering, e.g. `4m 7s`.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}
