//! `airmap` - Air quality risk assessment on an interactive map
//!
//! This library fetches the current AQI for a location from the WAQI API,
//! assesses a personal risk category from it, and renders both onto a
//! Leaflet map document.

pub mod config;
pub mod error;
pub mod map;
pub mod models;
pub mod pipeline;
pub mod risk;
pub mod waqi;

// Re-export core types for public API
pub use config::AirMapConfig;
pub use error::AirMapError;
pub use map::{HtmlMapRenderer, MapRenderer, MarkerColor, aqi_color};
pub use models::{AirQualityReading, UserProfile};
pub use pipeline::{AssessmentRequest, RunReport};
pub use risk::{RiskBreakdown, RiskCategory, assess_risk};
pub use waqi::{AirQualitySource, WaqiClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AirMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
