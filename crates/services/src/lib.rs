#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod feed;
pub mod module;
pub mod timer;

pub use quake_core::Clock;

pub use config::{FeedConfig, ModuleConfig};
pub use error::{ConfigError, FeedError, ModuleError};
pub use feed::{
    FeedQuery, FeedRefresh, FeedSnapshot, FeedSource, LiveFeed, LiveFeedPoller, UsgsFeedSource,
};
pub use module::{ModuleService, ModuleSession, ModuleStep};
pub use timer::SessionTimer;
