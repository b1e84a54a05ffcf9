use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use quake_core::model::{EventId, LiveEvent};

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::source::{FeedQuery, FeedSource};

/// GeoJSON summary feed published by the USGS Earthquake Hazards Program.
#[derive(Clone, Debug)]
pub struct UsgsFeedSource {
    client: Client,
    endpoint: Url,
}

impl UsgsFeedSource {
    /// # Errors
    ///
    /// Returns `FeedError::Http` if the HTTP client cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("quake-drill/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl FeedSource for UsgsFeedSource {
    async fn fetch(&self, _query: &FeedQuery) -> Result<Vec<LiveEvent>, FeedError> {
        let response = self.client.get(self.endpoint.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        parse_feature_collection(&body)
    }
}

/// Decode a GeoJSON feature collection into events.
///
/// Records with missing or invalid fields are skipped; only a body that is
/// not a feature collection at all is an error.
///
/// # Errors
///
/// Returns `FeedError::Malformed` if the document has no `features` array.
pub fn parse_feature_collection(body: &str) -> Result<Vec<LiveEvent>, FeedError> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    let total = collection.features.len();

    let events: Vec<LiveEvent> = collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| match parse_feature(raw) {
            Ok(event) => Some(event),
            Err(reason) => {
                debug!(index, reason, "skipping feed record");
                None
            }
        })
        .collect();

    if events.len() < total {
        debug!(kept = events.len(), total, "feed batch had unusable records");
    }
    Ok(events)
}

fn parse_feature(raw: serde_json::Value) -> Result<LiveEvent, &'static str> {
    let feature: Feature = serde_json::from_value(raw).map_err(|_| "unexpected shape")?;

    let id = feature.id.filter(|id| !id.trim().is_empty()).ok_or("missing id")?;
    let magnitude = feature.properties.mag.ok_or("missing magnitude")?;
    let place = feature.properties.place.ok_or("missing place")?;
    let millis = feature.properties.time.ok_or("missing time")?;
    let occurred_at = DateTime::from_timestamp_millis(millis).ok_or("time out of range")?;
    let [longitude, latitude, depth_km, ..] = feature.geometry.coordinates[..] else {
        return Err("expected three coordinates");
    };

    LiveEvent::new(
        EventId::new(id),
        magnitude,
        place,
        depth_km,
        latitude,
        longitude,
        occurred_at,
    )
    .map_err(|_| "invalid numeric field")
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: Option<String>,
    properties: Properties,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
