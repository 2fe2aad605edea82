use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    WeatherError,
    config::ProviderConfig,
    model::{
        Condition, CurrentConditions, ForecastTimeline, LocationQuery, PlaceCandidate, RawSample,
    },
};

use super::WeatherSource;

/// OpenWeather-compatible client: the public API, or any proxy that forwards
/// the same paths and JSON.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    weather_base_url: String,
    geo_base_url: String,
    search_limit: u8,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: impl Into<String>,
        provider: &ProviderConfig,
        search_limit: u8,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(Duration::from_secs(provider.timeout_secs)).build()?;

        Ok(Self {
            api_key: api_key.into(),
            weather_base_url: provider.weather_base_url.trim_end_matches('/').to_string(),
            geo_base_url: provider.geo_base_url.trim_end_matches('/').to_string(),
            search_limit,
            http,
        })
    }

    fn location_params(&self, query: &LocationQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            LocationQuery::Place(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        params.push(("units", "metric".to_string()));
        params.push(("appid", self.api_key.clone()));
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&'static str, String)],
        what: &str,
    ) -> Result<T, WeatherError> {
        tracing::debug!(%url, what, "requesting OpenWeather");

        let res = self.http.get(url).query(params).send().await.map_err(|e| {
            WeatherError::TransportFailure(format!("Failed to send {what} request: {e}"))
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::TransportFailure(format!("Failed to read {what} response body: {e}"))
        })?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::LocationNotFound(error_message(&body)));
        }

        if !status.is_success() {
            return Err(WeatherError::TransportFailure(format!(
                "OpenWeather {what} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::TransportFailure(format!("Failed to parse OpenWeather {what} JSON: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    #[serde(default)]
    timezone: i32,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    rain: Option<OwRain>,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: Option<String>,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: String,
}

/// `(condition, icon, description)` of the first weather entry.
fn describe(weather: &[OwWeather]) -> (Condition, Option<String>, String) {
    match weather.first() {
        Some(w) => (Condition::from_main(&w.main), w.icon.clone(), w.description.clone()),
        None => (Condition::Other, None, "Unknown".to_string()),
    }
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition, icon_code, description) = describe(&parsed.weather);

        CurrentConditions {
            location_name: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            observed_at: parsed.dt,
            utc_offset_secs: parsed.timezone,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            precipitation_mm: parsed.rain.and_then(|r| r.one_hour),
            condition,
            icon_code,
            description,
        }
    }
}

impl From<OwForecastEntry> for RawSample {
    fn from(entry: OwForecastEntry) -> Self {
        let (condition, icon_code, description) = describe(&entry.weather);

        RawSample {
            timestamp: entry.dt,
            temperature_c: entry.main.temp,
            temperature_min_c: entry.main.temp_min.unwrap_or(entry.main.temp),
            temperature_max_c: entry.main.temp_max.unwrap_or(entry.main.temp),
            condition,
            icon_code,
            description,
            humidity_pct: entry.main.humidity,
            wind_speed_mps: entry.wind.speed,
            precipitation_mm: entry.rain.and_then(|r| r.three_hours),
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_current(
        &self,
        query: &LocationQuery,
    ) -> Result<CurrentConditions, WeatherError> {
        let url = format!("{}/weather", self.weather_base_url);
        let parsed: OwCurrentResponse =
            self.get_json(&url, &self.location_params(query), "current weather").await?;

        Ok(parsed.into())
    }

    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
    ) -> Result<ForecastTimeline, WeatherError> {
        let url = format!("{}/forecast", self.weather_base_url);
        let parsed: OwForecastResponse =
            self.get_json(&url, &self.location_params(query), "forecast").await?;

        Ok(ForecastTimeline {
            location_name: parsed.city.name,
            country: parsed.city.country.unwrap_or_default(),
            utc_offset_secs: parsed.city.timezone,
            samples: parsed.list.into_iter().map(RawSample::from).collect(),
        })
    }

    async fn search_places(&self, text: &str) -> Result<Vec<PlaceCandidate>, WeatherError> {
        let url = format!("{}/direct", self.geo_base_url);
        let params = [
            ("q", text.to_string()),
            ("limit", self.search_limit.to_string()),
            ("appid", self.api_key.clone()),
        ];

        let places: Vec<OwPlace> = self
            .get_json(&url, &params, "place search")
            .await
            .map_err(WeatherError::into_search_failure)?;

        Ok(places
            .into_iter()
            .map(|p| PlaceCandidate {
                name: p.name,
                country: p.country,
                state: p.state,
                lat: p.lat,
                lon: p.lon,
            })
            .collect())
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<OwErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| truncate_body(body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
