//! Air quality client for the World Air Quality Index (WAQI) feed API
//!
//! One blocking request per lookup. Any failure collapses into "no data" for
//! the caller; the reason is only logged.

use crate::models::AirQualityReading;
use crate::{AirMapError, Result};
use chrono::DateTime;
use reqwest::blocking::Client;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// A source of current air quality readings
pub trait AirQualitySource {
    /// Fetch the current reading for a location, or `None` if no data is available
    fn fetch(&self, location: &str) -> Option<AirQualityReading>;
}

/// Blocking WAQI API client
pub struct WaqiClient {
    client: Client,
    api_base_url: String,
    token: String,
}

impl WaqiClient {
    /// Create a new WAQI client
    pub fn new<S: Into<String>>(api_base_url: S, token: S) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("airmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AirMapError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Feed endpoint URL for a location
    #[must_use]
    pub fn feed_url(&self, location: &str) -> String {
        format!(
            "{}/feed/{}/?token={}",
            self.api_base_url,
            urlencoding::encode(location),
            urlencoding::encode(&self.token)
        )
    }

    #[instrument(skip(self))]
    fn try_fetch(&self, location: &str) -> Result<AirQualityReading> {
        let start_time = Instant::now();
        info!("Requesting air quality feed for '{}'", location);

        let response = self
            .client
            .get(self.feed_url(location))
            .send()
            .map_err(|e| AirMapError::api(format!("Network error: {e}")))?;

        let status = response.status();
        debug!("HTTP response received: {}", status);
        if !status.is_success() {
            return Err(AirMapError::api(format!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body = response
            .text()
            .map_err(|e| AirMapError::api(format!("Failed to read response body: {e}")))?;
        let reading = parse_feed(location, &body)?;

        info!(
            "Retrieved AQI {} for '{}' in {:.3}s",
            reading.aqi,
            location,
            start_time.elapsed().as_secs_f64()
        );
        Ok(reading)
    }
}

impl AirQualitySource for WaqiClient {
    fn fetch(&self, location: &str) -> Option<AirQualityReading> {
        match self.try_fetch(location) {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!("No air quality data for '{}': {}", location, e);
                None
            }
        }
    }
}

/// Parse a WAQI feed response body into a reading
pub fn parse_feed(location: &str, body: &str) -> Result<AirQualityReading> {
    let envelope: feed::Envelope = serde_json::from_str(body)
        .map_err(|e| AirMapError::api(format!("Invalid feed response: {e}")))?;

    if envelope.status != "ok" {
        return Err(AirMapError::api(format!(
            "Service reported status '{}': {}",
            envelope.status, envelope.data
        )));
    }

    let data: feed::Data = serde_json::from_value(envelope.data)
        .map_err(|e| AirMapError::api(format!("Malformed feed data: {e}")))?;

    let (latitude, longitude) = match data.city.geo.as_slice() {
        [lat, lon] => (*lat, *lon),
        _ => {
            return Err(AirMapError::api(format!(
                "Expected [latitude, longitude], got {} values",
                data.city.geo.len()
            )));
        }
    };

    let observed_at = data
        .time
        .and_then(|t| t.iso)
        .and_then(|iso| DateTime::parse_from_rfc3339(&iso).ok());

    Ok(AirQualityReading {
        location_name: location.to_string(),
        aqi: data.aqi,
        latitude,
        longitude,
        station_name: data.city.name,
        dominant_pollutant: data.dominentpol,
        observed_at,
    })
}

/// WAQI API response structures
mod feed {
    use serde::Deserialize;
    use serde_json::Value;

    /// Top-level response; `data` is an object on success and a message string on error
    #[derive(Debug, Deserialize)]
    pub struct Envelope {
        pub status: String,
        #[serde(default)]
        pub data: Value,
    }

    #[derive(Debug, Deserialize)]
    pub struct Data {
        pub aqi: i32,
        pub city: City,
        pub dominentpol: Option<String>,
        pub time: Option<Time>,
    }

    #[derive(Debug, Deserialize)]
    pub struct City {
        pub geo: Vec<f64>,
        pub name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Time {
        pub iso: Option<String>,
    }
}
