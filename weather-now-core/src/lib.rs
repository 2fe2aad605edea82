//! Core library for Weather Now.
//!
//! This crate defines:
//! - Unit conversion of metric measurements for display
//! - Aggregation of the 3-hour forecast into hourly and daily views
//! - A debounced, race-safe place search session
//! - The view model composing fetched payloads into display data
//! - Configuration and the OpenWeather-compatible HTTP provider
//!
//! It is used by `weather-now-cli`, but has no terminal dependencies of its own.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod search;
pub mod units;
pub mod view;

pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use forecast::{DailySummary, ForecastView, HourlyEntry, IconCategory};
pub use model::{
    Condition, CurrentConditions, ForecastTimeline, LocationQuery, PlaceCandidate, RawSample,
};
pub use provider::{LocationDetector, WeatherSource};
pub use search::{SearchPhase, SearchSession, SearchSnapshot, driver::SearchDriver};
pub use units::{PrecipitationUnit, Reading, TemperatureUnit, UnitPreference, WindUnit};
pub use view::{Region, ViewState, WeatherDisplay, WeatherViewModel};
