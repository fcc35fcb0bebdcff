//! Air quality reading model for a single location

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Current air quality at a location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQualityReading {
    /// Location identifier the reading was requested for
    pub location_name: String,
    /// Air Quality Index (US EPA scale)
    pub aqi: i32,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Name of the monitoring station reported by the provider
    pub station_name: Option<String>,
    /// Dominant pollutant, e.g. "pm25"
    pub dominant_pollutant: Option<String>,
    /// Observation time in the station's local offset
    pub observed_at: Option<DateTime<FixedOffset>>,
}

impl AirQualityReading {
    /// Create a new reading without supplementary station data
    #[must_use]
    pub fn new(location_name: String, aqi: i32, latitude: f64, longitude: f64) -> Self {
        Self {
            location_name,
            aqi,
            latitude,
            longitude,
            station_name: None,
            dominant_pollutant: None,
            observed_at: None,
        }
    }

    /// Reading position as "lat, lon" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
