mod live;
mod poller;
mod source;
mod usgs;

// Public API of the live feed subsystem.
pub use live::{FeedRefresh, FeedSnapshot, LiveFeed};
pub use poller::LiveFeedPoller;
pub use source::{FeedQuery, FeedSource};
pub use usgs::{UsgsFeedSource, parse_feature_collection};
