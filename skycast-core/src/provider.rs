use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{config::Config, error::FetchError, model::WeatherRecord};

/// OpenWeather current-weather endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// HTTP client for one weather provider.
///
/// Holds the credential and base URL; each fetch is a single attempt with no
/// retry or timeout, and classification of the outcome is the caller-visible
/// contract. The client never touches persistence.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resolved_api_key())
    }

    /// Point the client at a different endpoint. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch current weather for a place name.
    ///
    /// Fails fast with `EmptyInput` on a blank name and `Unconfigured` when
    /// no credential is available; neither issues a request.
    pub async fn fetch_by_name(&self, city: &str) -> Result<WeatherRecord, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::EmptyInput);
        }

        let key = self.credential()?;

        tracing::debug!("Requesting current weather for `{city}`");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("q", city), ("appid", key), ("units", "metric")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Weather request for `{city}` failed with {status}");
            return Err(classify_failure(status, Some(city)));
        }

        let body = response.text().await?;
        normalize(&body)
    }

    /// Fetch current weather for coordinates.
    ///
    /// Same contract as [`fetch_by_name`](Self::fetch_by_name) except that a
    /// 404 classifies as a generic provider failure: the provider resolves
    /// any coordinate, so "not found" has no meaning here.
    pub async fn fetch_by_coords(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherRecord, FetchError> {
        let key = self.credential()?;

        tracing::debug!("Requesting current weather for ({lat}, {lon})");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", lat.to_string().as_str()),
                ("lon", lon.to_string().as_str()),
                ("appid", key),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Weather request for ({lat}, {lon}) failed with {status}");
            return Err(classify_failure(status, None));
        }

        let body = response.text().await?;
        normalize(&body)
    }

    fn credential(&self) -> Result<&str, FetchError> {
        self.api_key.as_deref().ok_or(FetchError::Unconfigured)
    }
}

fn classify_failure(status: StatusCode, city: Option<&str>) -> FetchError {
    match (status, city) {
        (StatusCode::NOT_FOUND, Some(city)) => FetchError::NotFound(city.to_string()),
        (StatusCode::UNAUTHORIZED, _) => FetchError::Unauthorized,
        _ => FetchError::Provider(status_line(status)),
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn normalize(body: &str) -> Result<WeatherRecord, FetchError> {
    let parsed: WireResponse =
        serde_json::from_str(body).map_err(|err| FetchError::Parse(err.to_string()))?;

    let condition = parsed
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("empty `weather` array".to_string()))?;

    let observed_at = parsed
        .dt
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    let record = WeatherRecord {
        location_name: parsed.name,
        country_code: parsed.sys.country,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity.min(100),
        pressure_hpa: parsed.main.pressure,
        wind_speed_ms: parsed.wind.speed,
        condition_category: condition.main,
        condition_description: condition.description,
        observed_at,
    };

    record
        .validate()
        .map_err(|field| FetchError::Parse(format!("non-finite value in `{field}`")))?;

    Ok(record)
}

#[derive(Debug, Deserialize)]
struct WireMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct WireCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct WireWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct WireSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    name: String,
    sys: WireSys,
    main: WireMain,
    weather: Vec<WireCondition>,
    wind: WireWind,
    dt: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/data/2.5/weather";

    fn client_for(server: &MockServer) -> WeatherClient {
        WeatherClient::new(Some("TESTKEY".to_string()))
            .with_base_url(format!("{}{}", server.uri(), ENDPOINT))
    }

    fn london_body() -> serde_json::Value {
        json!({
            "name": "London",
            "sys": { "country": "GB" },
            "main": { "temp": 17.64, "feels_like": 16.9, "humidity": 72, "pressure": 1013 },
            "weather": [{ "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
            "wind": { "speed": 4.12 },
            "dt": 1_700_000_000
        })
    }

    #[tokio::test]
    async fn success_normalizes_the_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .and(query_param("q", "London"))
            .and(query_param("appid", "TESTKEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).fetch_by_name("London").await.expect("fetch");

        assert_eq!(record.location_name, "London");
        assert_eq!(record.country_code, "GB");
        assert_eq!(record.temperature_c, 17.64);
        assert_eq!(record.humidity_pct, 72);
        assert_eq!(record.pressure_hpa, 1013.0);
        assert_eq!(record.condition_category, "Clouds");
        assert_eq!(record.condition_description, "broken clouds");
    }

    #[tokio::test]
    async fn input_is_trimmed_before_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).fetch_by_name("  London  ").await.expect("fetch");
    }

    #[tokio::test]
    async fn empty_input_fails_without_a_request() {
        let server = MockServer::start().await;

        let err = client_for(&server).fetch_by_name("   ").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyInput);
        assert!(server.received_requests().await.expect("recording").is_empty());
    }

    #[tokio::test]
    async fn missing_credential_fails_without_a_request() {
        let server = MockServer::start().await;
        let client = WeatherClient::new(None)
            .with_base_url(format!("{}{}", server.uri(), ENDPOINT));

        let by_name = client.fetch_by_name("London").await.unwrap_err();
        let by_coords = client.fetch_by_coords(51.5, -0.1).await.unwrap_err();

        assert_eq!(by_name.kind(), ErrorKind::Unconfigured);
        assert_eq!(by_coords.kind(), ErrorKind::Unconfigured);
        assert!(server.received_requests().await.expect("recording").is_empty());
    }

    #[tokio::test]
    async fn http_404_by_name_is_not_found_with_the_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_by_name("Nowhereville").await.unwrap_err();

        match err {
            FetchError::NotFound(city) => assert_eq!(city, "Nowhereville"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_401_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_by_name("London").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn other_statuses_are_provider_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_by_name("London").await.unwrap_err();

        match err {
            FetchError::Provider(line) => assert!(line.contains("503")),
            other => panic!("expected Provider, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn coords_request_carries_lat_lon_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.1"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).fetch_by_coords(51.5, -0.1).await.expect("fetch");
    }

    #[tokio::test]
    async fn coords_404_is_a_provider_error_not_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_by_coords(0.0, 0.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[tokio::test]
    async fn missing_fields_are_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "name": "London" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_by_name("London").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn empty_weather_array_is_a_parse_error() {
        let server = MockServer::start().await;
        let mut body = london_body();
        body["weather"] = json!([]);
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_by_name("London").await.unwrap_err();

        match err {
            FetchError::Parse(detail) => assert!(detail.contains("weather")),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn out_of_range_humidity_is_clamped() {
        let server = MockServer::start().await;
        let mut body = london_body();
        body["main"]["humidity"] = json!(140);
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let record = client_for(&server).fetch_by_name("London").await.expect("fetch");
        assert_eq!(record.humidity_pct, 100);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        // Bind a port to learn a free address, then release it so nothing is
        // listening when the client connects.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let client = WeatherClient::new(Some("TESTKEY".to_string()))
            .with_base_url(format!("http://{addr}{ENDPOINT}"));
        let err = client.fetch_by_name("London").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn missing_dt_falls_back_to_now() {
        let server = MockServer::start().await;
        let mut body = london_body();
        body.as_object_mut().expect("object").remove("dt");
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let before = Utc::now();
        let record = client_for(&server).fetch_by_name("London").await.expect("fetch");
        assert!(record.observed_at >= before);
    }
}
