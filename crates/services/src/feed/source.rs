use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use quake_core::model::LiveEvent;

use crate::error::FeedError;

/// Filter applied to every fetched batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedQuery {
    pub min_magnitude: f64,
    pub max_events: usize,
    /// How far back from the refresh instant an event may have occurred.
    pub window: Duration,
}

impl FeedQuery {
    /// Oldest qualifying `occurred_at` as of `now`. `None` when the window
    /// reaches past the representable range.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        TimeDelta::from_std(self.window)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
    }

    /// Keep qualifying events in source order, dropping repeated ids, up to the cap.
    #[must_use]
    pub fn apply(&self, events: Vec<LiveEvent>, now: DateTime<Utc>) -> Vec<LiveEvent> {
        let cutoff = self.cutoff(now);
        let mut seen = HashSet::new();
        events
            .into_iter()
            .filter(|event| event.magnitude() >= self.min_magnitude)
            .filter(|event| cutoff.is_none_or(|oldest| event.occurred_at() >= oldest))
            .filter(|event| seen.insert(event.id().clone()))
            .take(self.max_events)
            .collect()
    }
}

/// Anything that can produce a batch of recent events.
///
/// Implementations return events most-recent-first, as the upstream
/// provides them.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<LiveEvent>, FeedError>;
}
