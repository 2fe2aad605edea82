use crate::{
    Config, WeatherError,
    model::{CurrentConditions, ForecastTimeline, LocationQuery, PlaceCandidate},
    provider::{ipapi::IpApiDetector, openweather::OpenWeatherClient},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod ipapi;
pub mod openweather;

/// The three provider operations the app consumes.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(&self, query: &LocationQuery) -> Result<CurrentConditions, WeatherError>;

    /// 3-hour samples for the next five days, in provider order.
    async fn fetch_forecast(&self, query: &LocationQuery) -> Result<ForecastTimeline, WeatherError>;

    /// Ranked geocoding matches for free text; at most a handful.
    async fn search_places(&self, text: &str) -> Result<Vec<PlaceCandidate>, WeatherError>;
}

/// Best-effort guess of the user's city. `None` means "use the default".
#[async_trait]
pub trait LocationDetector: Send + Sync + Debug {
    async fn detect(&self) -> Option<String>;
}

/// Construct the weather source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherSource>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weather-now configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    let client = OpenWeatherClient::new(api_key, &config.provider, config.search_limit)?;
    Ok(Arc::new(client))
}

pub fn detector_from_config(config: &Config) -> anyhow::Result<Box<dyn LocationDetector>> {
    Ok(Box::new(IpApiDetector::new(&config.provider)?))
}
