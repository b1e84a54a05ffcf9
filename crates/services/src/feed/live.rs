use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use quake_core::Clock;
use quake_core::model::LiveEvent;

use crate::feed::source::{FeedQuery, FeedSource};

/// Published view of the live feed. Readers only ever see whole snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub events: Vec<LiveEvent>,
    /// Instant of the last successful refresh.
    pub last_updated: Option<DateTime<Utc>>,
    /// Set when the latest resolved fetch failed; `events` may be out of date.
    pub stale: bool,
    /// True until the first fetch resolves either way.
    pub loading: bool,
    pub last_error: Option<String>,
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            last_updated: None,
            stale: false,
            loading: true,
            last_error: None,
        }
    }
}

/// How a single `fetch_latest` call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedRefresh {
    Applied { count: usize },
    Failed,
    /// A later-issued fetch resolved first; this result was discarded.
    Superseded,
}

struct FeedInner {
    source: Arc<dyn FeedSource>,
    query: FeedQuery,
    clock: Clock,
    issued: AtomicU64,
    resolved: Mutex<u64>,
    snapshot: watch::Sender<FeedSnapshot>,
}

/// Cache of the most recent live events, refreshed on demand.
///
/// Cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct LiveFeed {
    inner: Arc<FeedInner>,
}

impl LiveFeed {
    #[must_use]
    pub fn new(source: Arc<dyn FeedSource>, query: FeedQuery, clock: Clock) -> Self {
        let (snapshot, _) = watch::channel(FeedSnapshot::default());
        Self {
            inner: Arc::new(FeedInner {
                source,
                query,
                clock,
                issued: AtomicU64::new(0),
                resolved: Mutex::new(0),
                snapshot,
            }),
        }
    }

    #[must_use]
    pub fn query(&self) -> FeedQuery {
        self.inner.query
    }

    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Fetch once and publish the result.
    ///
    /// The request is sequenced when this method is called, not when the
    /// returned future is first polled. A result is discarded if a request
    /// issued after it has already resolved. Failures keep the previous
    /// events and mark the snapshot stale; nothing is returned as an error.
    pub fn fetch_latest(&self) -> impl Future<Output = FeedRefresh> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        let seq = inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        async move { inner.resolve(seq).await }
    }
}

impl FeedInner {
    async fn resolve(&self, seq: u64) -> FeedRefresh {
        let result = self.source.fetch(&self.query).await;

        let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
        if seq < *resolved {
            debug!(seq, latest = *resolved, "discarding superseded feed result");
            return FeedRefresh::Superseded;
        }
        *resolved = seq;

        match result {
            Ok(events) => {
                let now = self.clock.now();
                let events = self.query.apply(events, now);
                let count = events.len();
                self.snapshot.send_modify(|snapshot| {
                    snapshot.events = events;
                    snapshot.last_updated = Some(now);
                    snapshot.stale = false;
                    snapshot.loading = false;
                    snapshot.last_error = None;
                });
                info!(seq, count, "live feed refreshed");
                FeedRefresh::Applied { count }
            }
            Err(err) => {
                warn!(seq, error = %err, "live feed refresh failed; keeping previous events");
                let message = err.to_string();
                self.snapshot.send_modify(|snapshot| {
                    snapshot.stale = true;
                    snapshot.loading = false;
                    snapshot.last_error = Some(message);
                });
                FeedRefresh::Failed
            }
        }
    }
}

impl std::fmt::Debug for LiveFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveFeed")
            .field("query", &self.inner.query)
            .field("issued", &self.inner.issued.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
