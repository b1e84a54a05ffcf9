use std::sync::Arc;
use std::time::Duration;

use url::Url;

use quake_core::model::QuestionCatalog;

use crate::error::ConfigError;
use crate::feed::FeedQuery;

/// USGS summary feed: magnitude 2.5+ over the past day.
pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_day.geojson";
pub const DEFAULT_MIN_MAGNITUDE: f64 = 2.5;
pub const DEFAULT_MAX_EVENTS: usize = 10;
pub const DEFAULT_EVENT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

//
// ─── FEED ──────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq)]
pub struct FeedConfig {
    pub endpoint: Url,
    pub min_magnitude: f64,
    pub max_events: usize,
    /// Events older than this, relative to the refresh instant, are dropped.
    pub window: Duration,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_FEED_URL).expect("default feed url should be valid"),
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            max_events: DEFAULT_MAX_EVENTS,
            window: DEFAULT_EVENT_WINDOW,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl FeedConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEndpoint` if `raw` is not an absolute URL.
    pub fn with_endpoint(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.endpoint = Url::parse(raw.trim())?;
        Ok(self)
    }

    #[must_use]
    pub fn with_min_magnitude(mut self, min_magnitude: f64) -> Self {
        self.min_magnitude = min_magnitude;
        self
    }

    #[must_use]
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_refresh_interval(mut self, every: Duration) -> Self {
        self.refresh_interval = every;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigError` for a negative or non-finite magnitude floor, a
    /// zero event cap, or a zero window, refresh interval or timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_magnitude.is_finite() || self.min_magnitude < 0.0 {
            return Err(ConfigError::InvalidMinMagnitude(self.min_magnitude));
        }
        if self.max_events == 0 {
            return Err(ConfigError::ZeroMaxEvents);
        }
        if self.window.is_zero() {
            return Err(ConfigError::ZeroInterval("event window"));
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("refresh interval"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroInterval("request timeout"));
        }
        Ok(())
    }

    #[must_use]
    pub fn query(&self) -> FeedQuery {
        FeedQuery {
            min_magnitude: self.min_magnitude,
            max_events: self.max_events,
            window: self.window,
        }
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// Everything a module session needs from outside. Nothing is read from
/// ambient state.
#[derive(Clone, Debug)]
pub struct ModuleConfig {
    pub learner_name: Option<String>,
    pub catalog: Arc<QuestionCatalog>,
    pub tick_period: Duration,
}

impl ModuleConfig {
    #[must_use]
    pub fn new(catalog: Arc<QuestionCatalog>) -> Self {
        Self {
            learner_name: None,
            catalog,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }

    #[must_use]
    pub fn earthquake() -> Self {
        Self::new(Arc::new(QuestionCatalog::earthquake()))
    }

    #[must_use]
    pub fn with_learner_name(mut self, name: Option<String>) -> Self {
        self.learner_name = name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigError::ZeroInterval` for a zero tick period.
    pub fn with_tick_period(mut self, period: Duration) -> Result<Self, ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::ZeroInterval("tick period"));
        }
        self.tick_period = period;
        Ok(self)
    }
}
