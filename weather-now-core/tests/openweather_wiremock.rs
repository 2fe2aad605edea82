//! Integration tests for the OpenWeather client using wiremock.
//!
//! These tests verify request shape and response mapping against a mock
//! HTTP server standing in for the provider (or the proxy in front of it).

use weather_now_core::{
    Condition, LocationDetector, LocationQuery, ProviderConfig, WeatherError, WeatherSource,
    provider::{ipapi::IpApiDetector, openweather::OpenWeatherClient},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn sample_current() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 13.41, "lat": 52.52 },
        "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10n" }],
        "main": {
            "temp": 6.3, "feels_like": 3.1, "temp_min": 5.0, "temp_max": 7.2,
            "pressure": 1012, "humidity": 87
        },
        "wind": { "speed": 5.0, "deg": 240 },
        "rain": { "1h": 0.51 },
        "dt": 1705345200,
        "sys": { "country": "DE", "sunrise": 1705302600, "sunset": 1705332000 },
        "timezone": 3600,
        "name": "Berlin",
        "cod": 200
    })
}

fn forecast_entry(dt: i64, dt_txt: &str, main: &str, icon: &str) -> serde_json::Value {
    serde_json::json!({
        "dt": dt,
        "main": {
            "temp": 5.0, "feels_like": 2.0, "temp_min": 4.0, "temp_max": 6.0, "humidity": 80
        },
        "weather": [{ "main": main, "description": main.to_lowercase(), "icon": icon }],
        "wind": { "speed": 3.2 },
        "dt_txt": dt_txt
    })
}

fn sample_forecast() -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "cnt": 3,
        "list": [
            forecast_entry(1705345200, "2024-01-15 19:00:00", "Clouds", "04n"),
            forecast_entry(1705356000, "2024-01-15 22:00:00", "Clear", "01n"),
            forecast_entry(1705366800, "2024-01-16 01:00:00", "Mist", "50n"),
        ],
        "city": { "name": "Berlin", "country": "DE", "timezone": 3600 }
    })
}

fn test_provider(mock_server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        weather_base_url: format!("{}/data/2.5", mock_server.uri()),
        geo_base_url: format!("{}/geo/1.0/", mock_server.uri()),
        ip_lookup_url: format!("{}/json/", mock_server.uri()),
        timeout_secs: 5,
    }
}

fn create_test_client(mock_server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::new("TEST_KEY", &test_provider(mock_server), 5).unwrap()
}

#[tokio::test]
async fn test_fetch_current_by_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Berlin"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let current = client.fetch_current(&LocationQuery::place("Berlin")).await.unwrap();

    assert_eq!(current.location_name, "Berlin");
    assert_eq!(current.country, "DE");
    assert_eq!(current.condition, Condition::Rain);
    assert_eq!(current.icon_code.as_deref(), Some("10n"));
    assert_eq!(current.humidity_pct, 87);
    assert_eq!(current.wind_speed_mps, 5.0);
    assert_eq!(current.precipitation_mm, Some(0.51));
    assert_eq!(current.utc_offset_secs, 3600);
}

#[tokio::test]
async fn test_fetch_current_by_coordinates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "52.52"))
        .and(query_param("lon", "13.41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let query = LocationQuery::Coordinates { lat: 52.52, lon: 13.41 };

    assert!(client.fetch_current(&query).await.is_ok());
}

#[tokio::test]
async fn test_fetch_forecast_keeps_provider_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_forecast()))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let timeline = client.fetch_forecast(&LocationQuery::place("Berlin")).await.unwrap();

    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline.utc_offset_secs, 3600);
    let stamps: Vec<_> = timeline.samples.iter().map(|s| s.timestamp).collect();
    assert_eq!(stamps, vec![1705345200, 1705356000, 1705366800]);
    assert_eq!(timeline.samples[2].condition, Condition::Other);
    assert_eq!(timeline.samples[0].temperature_min_c, 4.0);
    assert!(timeline.samples[0].precipitation_mm.is_none());
}

#[tokio::test]
async fn test_unknown_city_is_location_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.fetch_current(&LocationQuery::place("Atlantis")).await.unwrap_err();

    assert_eq!(err, WeatherError::LocationNotFound("city not found".into()));
}

#[tokio::test]
async fn test_server_error_is_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.fetch_forecast(&LocationQuery::place("Berlin")).await.unwrap_err();

    match err {
        WeatherError::TransportFailure(msg) => {
            assert!(msg.contains("502"));
            assert!(msg.contains("bad gateway"));
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.fetch_current(&LocationQuery::place("Berlin")).await.unwrap_err();

    assert!(matches!(err, WeatherError::TransportFailure(_)));
}

#[tokio::test]
async fn test_search_places_maps_candidates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "London"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "name": "London", "local_names": { "en": "London" },
                "lat": 51.5073, "lon": -0.1276, "country": "GB", "state": "England"
            },
            {
                "name": "London", "lat": 42.9834, "lon": -81.2330,
                "country": "CA", "state": "Ontario"
            },
            { "name": "London", "lat": 39.8865, "lon": -83.4483, "country": "US" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let places = client.search_places("London").await.unwrap();

    assert_eq!(places.len(), 3);
    assert_eq!(places[0].region_label(), "England, GB");
    assert_eq!(places[1].country, "CA");
    assert!(places[2].state.is_none());
    assert_eq!(places[0].query(), LocationQuery::place("London, GB"));
}

#[tokio::test]
async fn test_search_failure_is_soft() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            serde_json::json!({ "cod": 401, "message": "Invalid API key" }),
        ))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.search_places("London").await.unwrap_err();

    assert!(matches!(err, WeatherError::SearchFailure(_)));
}

// ============================================================================
// IP location detection
// ============================================================================

#[tokio::test]
async fn test_detect_city_from_ip_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7", "city": "Leipzig", "country_code": "DE"
        })))
        .mount(&mock_server)
        .await;

    let detector = IpApiDetector::new(&test_provider(&mock_server)).unwrap();
    assert_eq!(detector.detect().await.as_deref(), Some("Leipzig"));
}

#[tokio::test]
async fn test_detect_without_city_yields_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": true, "reason": "RateLimited" })),
        )
        .mount(&mock_server)
        .await;

    let detector = IpApiDetector::new(&test_provider(&mock_server)).unwrap();
    assert!(detector.detect().await.is_none());
}

#[tokio::test]
async fn test_detect_server_error_yields_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let detector = IpApiDetector::new(&test_provider(&mock_server)).unwrap();
    assert!(detector.detect().await.is_none());
}
