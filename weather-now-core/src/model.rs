use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-reported weather category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Other,
}

impl Condition {
    /// Map the provider's `weather[].main` value; anything unrecognised
    /// (Mist, Haze, Fog, ...) becomes `Other`.
    pub fn from_main(main: &str) -> Self {
        match main {
            "Clear" => Condition::Clear,
            "Clouds" => Condition::Clouds,
            "Rain" => Condition::Rain,
            "Drizzle" => Condition::Drizzle,
            "Thunderstorm" => Condition::Thunderstorm,
            "Snow" => Condition::Snow,
            _ => Condition::Other,
        }
    }
}

/// Where to fetch weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationQuery {
    /// Free-text place name, e.g. "Berlin" or "Paris, FR".
    Place(String),
    Coordinates { lat: f64, lon: f64 },
}

impl LocationQuery {
    pub fn place(name: impl Into<String>) -> Self {
        LocationQuery::Place(name.into())
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Place(name) => f.write_str(name),
            LocationQuery::Coordinates { lat, lon } => write!(f, "{lat:.4}, {lon:.4}"),
        }
    }
}

/// One 3-hour forecast data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Epoch seconds.
    pub timestamp: i64,
    pub temperature_c: f64,
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
    pub condition: Condition,
    pub icon_code: Option<String>,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub precipitation_mm: Option<f64>,
}

/// Forecast samples in provider order: strictly increasing timestamps at a
/// fixed 3-hour cadence, starting at an arbitrary hour.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastTimeline {
    pub location_name: String,
    pub country: String,
    /// Offset of the place's local time from UTC, in seconds.
    pub utc_offset_secs: i32,
    pub samples: Vec<RawSample>,
}

impl ForecastTimeline {
    pub fn new(samples: Vec<RawSample>) -> Self {
        Self { samples, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn offset(&self) -> FixedOffset {
        local_offset(self.utc_offset_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    /// Epoch seconds of the observation.
    pub observed_at: i64,
    pub utc_offset_secs: i32,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    /// Rain over the last hour.
    pub precipitation_mm: Option<f64>,
    pub condition: Condition,
    pub icon_code: Option<String>,
    pub description: String,
}

impl CurrentConditions {
    pub fn observed_local(&self) -> DateTime<FixedOffset> {
        to_local(self.observed_at, self.utc_offset_secs)
    }
}

/// A geocoding match offered as a search suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl PlaceCandidate {
    /// UI key; candidates are identified by their coordinates.
    pub fn key(&self) -> String {
        format!("{}-{}", self.lat, self.lon)
    }

    /// The composite used to fetch weather for this place.
    pub fn query(&self) -> LocationQuery {
        LocationQuery::Place(format!("{}, {}", self.name, self.country))
    }

    /// Secondary label, e.g. "Ontario, CA" or just "GB".
    pub fn region_label(&self) -> String {
        match &self.state {
            Some(state) if !state.is_empty() => format!("{state}, {}", self.country),
            _ => self.country.clone(),
        }
    }
}

pub(crate) fn local_offset(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

pub(crate) fn to_local(timestamp: i64, utc_offset_secs: i32) -> DateTime<FixedOffset> {
    let utc = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_default();
    utc.with_timezone(&local_offset(utc_offset_secs))
}
