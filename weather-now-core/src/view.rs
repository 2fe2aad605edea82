//! The state the presentation layer renders: loading/error/content, unit
//! preference, dropdown visibility and the place search.

use serde::Serialize;
use std::{sync::Arc, time::Duration};

use crate::{
    WeatherError,
    forecast::{self, DailySummary, HourlyEntry, IconCategory},
    model::{CurrentConditions, ForecastTimeline, LocationQuery},
    provider::{LocationDetector, WeatherSource},
    search::{SearchSnapshot, driver::SearchDriver},
    units::{self, PrecipitationUnit, Reading, TemperatureUnit, UnitPreference, WindUnit},
};

/// Shown for any current/forecast failure; the cause is only logged.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data. Please try again.";

/// Collapsible UI regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Suggestions,
    UnitsMenu,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Suggestions, Region::UnitsMenu];
}

/// Both payloads for one location, fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub query: LocationQuery,
    pub current: CurrentConditions,
    pub forecast: ForecastTimeline,
}

/// Strictly one of loading, error or full content.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Failed { message: String, cause: WeatherError },
    Ready(Box<WeatherSnapshot>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentCard {
    /// e.g. "Berlin, DE"
    pub place: String,
    /// e.g. "Monday, Jan 15, 2024"
    pub date: String,
    pub icon: IconCategory,
    pub temperature: Reading<i64>,
    pub feels_like: Reading<i64>,
    pub humidity_pct: u8,
    pub wind: Reading<i64>,
    pub precipitation: Reading<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDisplay {
    pub current: CurrentCard,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailySummary>,
}

/// Pure derivation of everything displayed from the fetched payloads.
pub fn derive_display(snapshot: &WeatherSnapshot, prefs: &UnitPreference) -> WeatherDisplay {
    let current = &snapshot.current;
    let place = if current.country.is_empty() {
        current.location_name.clone()
    } else {
        format!("{}, {}", current.location_name, current.country)
    };

    let card = CurrentCard {
        place,
        date: current.observed_local().format("%A, %b %-d, %Y").to_string(),
        icon: forecast::icon_category(current.condition, current.icon_code.as_deref()),
        temperature: units::temperature(current.temperature_c, prefs),
        feels_like: units::temperature(current.feels_like_c, prefs),
        humidity_pct: current.humidity_pct,
        wind: units::wind_speed(current.wind_speed_mps, prefs),
        precipitation: units::precipitation(current.precipitation_mm, prefs),
        description: current.description.clone(),
    };

    let view = forecast::aggregate(&snapshot.forecast, prefs);
    WeatherDisplay { current: card, hourly: view.hourly, daily: view.daily }
}

#[derive(Debug)]
pub struct WeatherViewModel {
    source: Arc<dyn WeatherSource>,
    default_location: LocationQuery,
    last_location: Option<LocationQuery>,
    units: UnitPreference,
    state: ViewState,
    units_menu_open: bool,
    search: SearchDriver,
}

impl WeatherViewModel {
    /// Starts in the loading state; call [`mount`](Self::mount) or
    /// [`load`](Self::load) next. Must be created inside a tokio runtime.
    pub fn new(
        source: Arc<dyn WeatherSource>,
        default_location: impl Into<String>,
        search_debounce: Duration,
    ) -> Self {
        let search = SearchDriver::new(Arc::clone(&source), search_debounce);

        Self {
            source,
            default_location: LocationQuery::Place(default_location.into()),
            last_location: None,
            units: UnitPreference::default(),
            state: ViewState::Loading,
            units_menu_open: false,
            search,
        }
    }

    /// Resolve the initial location and load it. Detection failure silently
    /// falls back to the default location.
    pub async fn mount(&mut self, detector: &dyn LocationDetector) {
        let query = match detector.detect().await {
            Some(city) => LocationQuery::Place(city),
            None => {
                tracing::info!(fallback = %self.default_location, "location detection unavailable");
                self.default_location.clone()
            }
        };

        self.load(query).await;
    }

    /// Fetch current conditions and forecast concurrently. Content is shown
    /// only if both succeed.
    pub async fn load(&mut self, query: LocationQuery) {
        self.state = ViewState::Loading;
        self.search.collapse();

        let source = Arc::clone(&self.source);
        let fetched =
            tokio::try_join!(source.fetch_current(&query), source.fetch_forecast(&query));

        match fetched {
            Ok((current, forecast)) => {
                tracing::info!(%query, "weather loaded");
                self.last_location = Some(query.clone());
                self.search.clear();
                self.state =
                    ViewState::Ready(Box::new(WeatherSnapshot { query, current, forecast }));
            }
            Err(cause) => {
                tracing::error!(%query, "weather fetch failed: {cause}");
                self.state = ViewState::Failed { message: FETCH_FAILED_MESSAGE.to_string(), cause };
            }
        }
    }

    /// Re-issue the fetch for the last location that loaded, or the default.
    pub async fn retry(&mut self) {
        let query = self.retry_location().clone();
        self.load(query).await;
    }

    pub fn retry_location(&self) -> &LocationQuery {
        self.last_location.as_ref().unwrap_or(&self.default_location)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Display values under the current unit preference; `None` unless both
    /// payloads are loaded.
    pub fn display(&self) -> Option<WeatherDisplay> {
        match &self.state {
            ViewState::Ready(snapshot) => Some(derive_display(snapshot, &self.units)),
            _ => None,
        }
    }

    pub fn units(&self) -> UnitPreference {
        self.units
    }

    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) {
        self.units.temperature = unit;
        self.units_menu_open = false;
    }

    pub fn set_wind_unit(&mut self, unit: WindUnit) {
        self.units.wind = unit;
        self.units_menu_open = false;
    }

    pub fn set_precipitation_unit(&mut self, unit: PrecipitationUnit) {
        self.units.precipitation = unit;
        self.units_menu_open = false;
    }

    pub fn search(&self) -> &SearchDriver {
        &self.search
    }

    pub fn search_snapshot(&self) -> SearchSnapshot {
        self.search.snapshot()
    }

    /// Typing in the search box.
    pub fn input_search(&mut self, text: impl Into<String>) {
        self.search.input(text);
    }

    /// Pick a suggestion and load its weather. Out-of-range indexes are ignored.
    pub async fn select_suggestion(&mut self, index: usize) {
        if let Some(query) = self.search.select(index) {
            self.load(query).await;
        }
    }

    /// Load the typed text as-is. Blank text is ignored.
    pub async fn submit_search(&mut self) {
        if let Some(query) = self.search.submit() {
            self.load(query).await;
        }
    }

    pub fn is_open(&self, region: Region) -> bool {
        match region {
            Region::Suggestions => self.search.snapshot().suggestions_visible,
            Region::UnitsMenu => self.units_menu_open,
        }
    }

    pub fn collapse(&mut self, region: Region) {
        match region {
            Region::Suggestions => self.search.collapse(),
            Region::UnitsMenu => self.units_menu_open = false,
        }
    }

    pub fn expand(&mut self, region: Region) {
        match region {
            Region::Suggestions => self.search.expand(),
            Region::UnitsMenu => self.units_menu_open = true,
        }
    }

    pub fn toggle_units_menu(&mut self) {
        self.units_menu_open = !self.units_menu_open;
    }

    /// The host saw a pointer press; `inside` is the region it landed in, if
    /// any. Every other region collapses. Query text is untouched.
    pub fn pointer_outside(&mut self, inside: Option<Region>) {
        for region in Region::ALL {
            if Some(region) != inside {
                self.collapse(region);
            }
        }
    }

    /// Stop pending search timers before the view goes away.
    pub fn shutdown(&mut self) {
        self.search.shutdown();
    }
}
