//! Device location: convert "where am I" into coordinates for a weather
//! lookup. Uses ip-api.com - free, no API key required.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{error::FetchError, model::Coordinates};

const IP_API_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Supplies the device's coordinates, or fails with a geolocation error.
///
/// Desktop embedders can provide an OS-backed source; the CLI ships the
/// IP-based one below.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current(&self) -> Result<Coordinates, FetchError>;
}

/// Coarse location from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocationSource {
    endpoint: String,
}

impl IpLocationSource {
    pub fn new() -> Self {
        Self { endpoint: IP_API_URL.to_string() }
    }

    /// Point the source at a different endpoint. Used by tests.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Default for IpLocationSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

#[async_trait]
impl LocationSource for IpLocationSource {
    async fn current(&self) -> Result<Coordinates, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| {
                tracing::warn!("Failed to create geolocation client: {err}");
                FetchError::GeolocationUnavailable
            })?;

        let response = match client.get(&self.endpoint).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Geolocation request failed: {err}");
                return Err(FetchError::GeolocationUnavailable);
            }
        };

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(FetchError::GeolocationDenied);
        }
        if !status.is_success() {
            tracing::warn!("Geolocation service returned status {status}");
            return Err(FetchError::GeolocationUnavailable);
        }

        let body: IpApiResponse = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("Geolocation parse error: {err}");
                return Err(FetchError::GeolocationUnavailable);
            }
        };

        if body.status != "success" {
            tracing::warn!(
                "Geolocation lookup failed: {}",
                body.message.as_deref().unwrap_or("no reason given")
            );
            return Err(FetchError::GeolocationUnavailable);
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates { latitude, longitude }),
            _ => Err(FetchError::GeolocationUnavailable),
        }
    }
}
