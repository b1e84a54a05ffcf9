//! Elapsed-time ticker for a module session.
//!
//! Ticks are scheduled on multiples of the period from the session origin,
//! so a slow tick never pushes later ones back. The ticking task is owned by
//! the `SessionTimer` and aborted when the timer is stopped or dropped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use quake_core::time::ElapsedTracker;

struct TimerShared {
    tracker: Mutex<ElapsedTracker>,
    elapsed: watch::Sender<u64>,
}

impl TimerShared {
    fn observe(&self, since_origin: Duration) {
        let mut tracker = self.tracker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(seconds) = tracker.observe(since_origin) {
            publish(&self.elapsed, seconds);
        }
    }

    fn freeze(&self, since_origin: Duration) -> u64 {
        let mut tracker = self.tracker.lock().unwrap_or_else(PoisonError::into_inner);
        let seconds = tracker.freeze(since_origin);
        publish(&self.elapsed, seconds);
        seconds
    }
}

fn publish(tx: &watch::Sender<u64>, seconds: u64) {
    tx.send_if_modified(|current| {
        if *current == seconds {
            false
        } else {
            *current = seconds;
            true
        }
    });
}

/// Tracks whole seconds since a session started.
pub struct SessionTimer {
    started_at: DateTime<Utc>,
    origin: Instant,
    shared: Arc<TimerShared>,
    task: Option<JoinHandle<()>>,
}

impl SessionTimer {
    /// Start ticking every `period`, measuring from now.
    ///
    /// `started_at` is the wall-clock stamp reported in summaries.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(started_at: DateTime<Utc>, period: Duration) -> Self {
        let origin = Instant::now();
        let (elapsed, _) = watch::channel(0);
        let shared = Arc::new(TimerShared {
            tracker: Mutex::new(ElapsedTracker::new()),
            elapsed,
        });
        let task = tokio::spawn(tick(Arc::clone(&shared), origin, period));

        Self {
            started_at,
            origin,
            shared,
            task: Some(task),
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds as of the most recent tick, or the frozen value once stopped.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        *self.shared.elapsed.borrow()
    }

    /// Receiver that changes whenever the displayed second count changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.elapsed.subscribe()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Cancel ticking and freeze the elapsed value at this instant.
    ///
    /// Safe to call more than once; later calls return the frozen value.
    pub fn stop(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.shared.freeze(self.origin.elapsed())
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("session timer cancelled on drop");
        }
    }
}

impl std::fmt::Debug for SessionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTimer")
            .field("started_at", &self.started_at)
            .field("elapsed_seconds", &self.elapsed_seconds())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

async fn tick(shared: Arc<TimerShared>, origin: Instant, period: Duration) {
    let mut ticks = time::interval_at(origin + period, period);
    // Skip keeps later ticks on the origin-aligned schedule.
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticks.tick().await;
        shared.observe(origin.elapsed());
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
