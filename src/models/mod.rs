//! Data models for the airmap application
//!
//! This module contains the core domain models organized by concern:
//! - Reading: A single air quality observation for a location
//! - Profile: The user attributes that feed the risk assessment

pub mod profile;
pub mod reading;

// Re-export all public types for convenient access
pub use profile::UserProfile;
pub use reading::AirQualityReading;
