use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::feed::live::LiveFeed;

/// Keeps a `LiveFeed` fresh on a fixed interval.
///
/// The first refresh is issued immediately. Dropping the poller cancels the
/// schedule, including any refresh still in flight.
pub struct LiveFeedPoller {
    feed: LiveFeed,
    every: Duration,
    task: Option<JoinHandle<()>>,
}

impl LiveFeedPoller {
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(feed: LiveFeed, every: Duration) -> Self {
        let task = tokio::spawn(refresh_loop(feed.clone(), every));
        Self {
            feed,
            every,
            task: Some(task),
        }
    }

    #[must_use]
    pub fn feed(&self) -> &LiveFeed {
        &self.feed
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.every
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("live feed poller stopped");
        }
    }
}

impl Drop for LiveFeedPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for LiveFeedPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveFeedPoller")
            .field("feed", &self.feed)
            .field("every", &self.every)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn refresh_loop(feed: LiveFeed, every: Duration) {
    let mut ticks = time::interval(every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticks.tick().await;
        feed.fetch_latest().await;
    }
}
