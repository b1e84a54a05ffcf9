use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::EventId;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LiveEventError {
    #[error("magnitude must be finite and non-negative, got {0}")]
    InvalidMagnitude(f64),
    #[error("depth must be finite, got {0}")]
    InvalidDepth(f64),
    #[error("coordinates must be finite")]
    InvalidCoordinates,
}

/// Severity bucket used when displaying a live event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MagnitudeClass {
    Minor,
    Moderate,
    Strong,
    Major,
}

impl MagnitudeClass {
    #[must_use]
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude >= 6.0 {
            Self::Major
        } else if magnitude >= 5.0 {
            Self::Strong
        } else if magnitude >= 4.0 {
            Self::Moderate
        } else {
            Self::Minor
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
            Self::Major => "Major",
        }
    }
}

/// One externally reported seismic event. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvent {
    id: EventId,
    magnitude: f64,
    location: String,
    depth_km: f64,
    latitude: f64,
    longitude: f64,
    occurred_at: DateTime<Utc>,
}

impl LiveEvent {
    /// # Errors
    ///
    /// Returns `LiveEventError` if magnitude is negative or any number is not finite.
    pub fn new(
        id: EventId,
        magnitude: f64,
        location: impl Into<String>,
        depth_km: f64,
        latitude: f64,
        longitude: f64,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, LiveEventError> {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(LiveEventError::InvalidMagnitude(magnitude));
        }
        if !depth_km.is_finite() {
            return Err(LiveEventError::InvalidDepth(depth_km));
        }
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(LiveEventError::InvalidCoordinates);
        }

        Ok(Self {
            id,
            magnitude,
            location: location.into(),
            depth_km,
            latitude,
            longitude,
            occurred_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &EventId {
        &self.id
    }

    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn depth_km(&self) -> f64 {
        self.depth_km
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    #[must_use]
    pub fn class(&self) -> MagnitudeClass {
        MagnitudeClass::from_magnitude(self.magnitude)
    }
}
