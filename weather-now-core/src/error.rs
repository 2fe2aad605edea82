use thiserror::Error;

/// Failures of the provider-facing operations.
///
/// Current/forecast fetches treat `LocationNotFound` and `TransportFailure` as
/// one opaque, retriable failure. `SearchFailure` is soft: it only suppresses
/// the suggestion list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Place search failed: {0}")]
    SearchFailure(String),
}

impl WeatherError {
    /// Re-tag any failure of a place lookup as a soft search failure.
    pub fn into_search_failure(self) -> Self {
        match self {
            WeatherError::SearchFailure(_) => self,
            WeatherError::LocationNotFound(msg) | WeatherError::TransportFailure(msg) => {
                WeatherError::SearchFailure(msg)
            }
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::TransportFailure(err.to_string())
    }
}
