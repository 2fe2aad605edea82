use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{WeatherError, config::ProviderConfig};

use super::LocationDetector;

/// Guesses the user's city from their public IP (ipapi.co JSON shape).
#[derive(Debug, Clone)]
pub struct IpApiDetector {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    city: Option<String>,
}

impl IpApiDetector {
    pub fn new(provider: &ProviderConfig) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(Duration::from_secs(provider.timeout_secs)).build()?;
        Ok(Self { url: provider.ip_lookup_url.clone(), http })
    }
}

#[async_trait]
impl LocationDetector for IpApiDetector {
    /// Any failure (network, status, body, missing city) yields `None`.
    async fn detect(&self) -> Option<String> {
        let res = match self.http.get(&self.url).send().await {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!("IP geolocation request failed: {e}");
                return None;
            }
        };

        if !res.status().is_success() {
            tracing::warn!("IP geolocation returned status {}", res.status());
            return None;
        }

        let body: IpApiResponse = match res.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("IP geolocation parse error: {e}");
                return None;
            }
        };

        let city = body.city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        if let Some(city) = &city {
            tracing::info!("Detected location: {city}");
        }
        city
    }
}
