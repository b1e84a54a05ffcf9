use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use quake_core::model::{EventId, LiveEvent};
use quake_core::time::{fixed_clock, fixed_now};
use services::{FeedError, FeedQuery, FeedRefresh, FeedSource, LiveFeed, LiveFeedPoller};

const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);

fn events(prefix: &str, n: usize) -> Vec<LiveEvent> {
    (0..n)
        .map(|i| {
            LiveEvent::new(
                EventId::new(format!("{prefix}-{i}")),
                2.5 + i as f64 / 10.0,
                format!("{i} km E of Testville"),
                12.0,
                34.0,
                -118.0,
                fixed_now(),
            )
            .unwrap()
        })
        .collect()
}

fn query() -> FeedQuery {
    FeedQuery {
        min_magnitude: 2.5,
        max_events: 10,
        window: Duration::from_secs(24 * 60 * 60),
    }
}

fn ids(feed: &LiveFeed) -> Vec<String> {
    feed.snapshot()
        .events
        .iter()
        .map(|e| e.id().as_str().to_owned())
        .collect()
}

/// Returns scripted results in call order, each after its own delay.
struct DelayedSource {
    script: Mutex<VecDeque<(Duration, Result<Vec<LiveEvent>, FeedError>)>>,
}

impl DelayedSource {
    fn new(script: Vec<(Duration, Result<Vec<LiveEvent>, FeedError>)>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }
}

#[async_trait]
impl FeedSource for DelayedSource {
    async fn fetch(&self, _query: &FeedQuery) -> Result<Vec<LiveEvent>, FeedError> {
        let next = self.script.lock().unwrap().pop_front();
        let (delay, result) = next.unwrap_or((Duration::ZERO, Ok(Vec::new())));
        tokio::time::sleep(delay).await;
        result
    }
}

/// Counts calls and always succeeds with one event.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl FeedSource for CountingSource {
    async fn fetch(&self, _query: &FeedQuery) -> Result<Vec<LiveEvent>, FeedError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(events(&format!("call{n}"), 1))
    }
}

fn bad_gateway() -> FeedError {
    FeedError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY)
}

#[tokio::test(start_paused = true)]
async fn earlier_fetch_finishing_last_is_discarded() {
    let source = DelayedSource::new(vec![
        (Duration::from_millis(200), Ok(events("a", 3))),
        (Duration::from_millis(50), Ok(events("b", 2))),
    ]);
    let feed = LiveFeed::new(source, query(), fixed_clock());

    let first = feed.fetch_latest();
    let second = feed.fetch_latest();
    let (first, second) = tokio::join!(first, second);

    assert_eq!(second, FeedRefresh::Applied { count: 2 });
    assert_eq!(first, FeedRefresh::Superseded);
    assert_eq!(ids(&feed), ["b-0", "b-1"]);
}

#[tokio::test(start_paused = true)]
async fn later_fetch_finishing_last_wins() {
    let source = DelayedSource::new(vec![
        (Duration::from_millis(50), Ok(events("a", 3))),
        (Duration::from_millis(200), Ok(events("b", 2))),
    ]);
    let feed = LiveFeed::new(source, query(), fixed_clock());

    let (first, second) = tokio::join!(feed.fetch_latest(), feed.fetch_latest());

    assert_eq!(first, FeedRefresh::Applied { count: 3 });
    assert_eq!(second, FeedRefresh::Applied { count: 2 });
    assert_eq!(ids(&feed), ["b-0", "b-1"]);
}

#[tokio::test(start_paused = true)]
async fn superseded_failure_does_not_mark_stale() {
    let source = DelayedSource::new(vec![
        (Duration::from_millis(300), Err(bad_gateway())),
        (Duration::from_millis(10), Ok(events("fresh", 4))),
    ]);
    let feed = LiveFeed::new(source, query(), fixed_clock());

    let (first, second) = tokio::join!(feed.fetch_latest(), feed.fetch_latest());

    assert_eq!(first, FeedRefresh::Superseded);
    assert_eq!(second, FeedRefresh::Applied { count: 4 });
    assert!(!feed.snapshot().stale);
}

#[tokio::test]
async fn stale_feed_keeps_previous_events() {
    let source = DelayedSource::new(vec![
        (Duration::ZERO, Ok(events("ok", 5))),
        (Duration::ZERO, Err(bad_gateway())),
    ]);
    let feed = LiveFeed::new(source, query(), fixed_clock());

    assert_eq!(feed.fetch_latest().await, FeedRefresh::Applied { count: 5 });
    assert_eq!(feed.fetch_latest().await, FeedRefresh::Failed);

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.events.len(), 5);
    assert!(snapshot.stale);
    assert_eq!(snapshot.last_updated, Some(fixed_now()));
}

#[tokio::test(start_paused = true)]
async fn poller_refreshes_immediately_then_on_interval() {
    let source = Arc::new(CountingSource::default());
    let feed = LiveFeed::new(source.clone(), query(), fixed_clock());
    let poller = LiveFeedPoller::start(feed, FIVE_MINUTES);
    let mut updates = poller.feed().subscribe();

    updates.changed().await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(ids(poller.feed()), ["call0-0"]);

    tokio::time::sleep(FIVE_MINUTES * 2 + Duration::from_secs(1)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(ids(poller.feed()), ["call2-0"]);
}

#[tokio::test(start_paused = true)]
async fn dropped_poller_never_fetches_again() {
    let source = Arc::new(CountingSource::default());
    let feed = LiveFeed::new(source.clone(), query(), fixed_clock());
    let poller = LiveFeedPoller::start(feed.clone(), FIVE_MINUTES);

    let mut updates = feed.subscribe();
    updates.changed().await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    drop(poller);
    tokio::time::sleep(FIVE_MINUTES * 6).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(!updates.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn manual_fetch_alongside_schedule_is_safe() {
    let source = Arc::new(CountingSource::default());
    let feed = LiveFeed::new(source.clone(), query(), fixed_clock());
    let mut poller = LiveFeedPoller::start(feed.clone(), FIVE_MINUTES);

    let manual = feed.fetch_latest().await;
    assert!(matches!(manual, FeedRefresh::Applied { .. } | FeedRefresh::Superseded));

    poller.shutdown();
    assert!(!poller.is_running());
    assert!(!feed.snapshot().loading);
}
