//! Configuration management for the `airmap` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AirMapError;
use crate::models::UserProfile;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `airmap` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirMapConfig {
    /// WAQI API configuration
    #[serde(default)]
    pub waqi: WaqiConfig,
    /// Map output configuration
    #[serde(default)]
    pub map: MapConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default location and user profile
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// WAQI API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaqiConfig {
    /// API token, also used for the tile overlay
    pub token: Option<String>,
    /// Base URL for the feed API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL for the map tile service
    #[serde(default = "default_tiles_base_url")]
    pub tiles_base_url: String,
}

/// Map output configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Path the HTML document is written to
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Circle marker radius in pixels
    #[serde(default = "default_marker_radius")]
    pub marker_radius: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Default location and profile used when no CLI arguments are given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_age")]
    pub age: i32,
    #[serde(default)]
    pub pregnant: bool,
    #[serde(default = "default_nationality")]
    pub nationality: String,
}

// Default value functions
fn default_api_base_url() -> String {
    "https://api.waqi.info".to_string()
}

fn default_tiles_base_url() -> String {
    "https://tiles.waqi.info".to_string()
}

fn default_output_path() -> String {
    "map/air_quality_map.html".to_string()
}

fn default_zoom() -> u8 {
    10
}

fn default_marker_radius() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_location() -> String {
    "Bangkok".to_string()
}

fn default_age() -> i32 {
    65
}

fn default_nationality() -> String {
    "Japanese".to_string()
}

impl Default for WaqiConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: default_api_base_url(),
            tiles_base_url: default_tiles_base_url(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            zoom: default_zoom(),
            marker_radius: default_marker_radius(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            age: default_age(),
            pregnant: false,
            nationality: default_nationality(),
        }
    }
}

impl DefaultsConfig {
    /// User profile described by these defaults
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile::new(self.age, self.pregnant, self.nationality.clone())
    }
}

impl AirMapConfig {
    /// Load configuration from the given path, or the default location
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // e.g. AIRMAP_WAQI__TOKEN overrides waqi.token
        builder = builder.add_source(
            Environment::with_prefix("AIRMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AirMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("airmap").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.waqi.api_base_url.is_empty() {
            self.waqi.api_base_url = default_api_base_url();
        }
        if self.waqi.tiles_base_url.is_empty() {
            self.waqi.tiles_base_url = default_tiles_base_url();
        }
        if self.map.output_path.is_empty() {
            self.map.output_path = default_output_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.defaults.location.is_empty() {
            self.defaults.location = default_location();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_token()?;
        self.validate_map()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the WAQI token if one is configured
    pub fn validate_token(&self) -> Result<()> {
        if let Some(token) = &self.waqi.token {
            if token.trim().is_empty() {
                return Err(AirMapError::config(
                    "WAQI token cannot be empty if provided. Either remove it or provide a valid token."
                ).into());
            }

            if token.chars().any(char::is_whitespace) {
                return Err(AirMapError::config(
                    "WAQI token must not contain whitespace. Please check your token."
                ).into());
            }
        }

        Ok(())
    }

    fn validate_map(&self) -> Result<()> {
        if self.map.zoom > 19 {
            return Err(AirMapError::config("Map zoom cannot exceed 19").into());
        }

        if self.map.marker_radius == 0 {
            return Err(AirMapError::config("Marker radius must be at least 1").into());
        }

        if self.map.output_path.trim().is_empty() {
            return Err(AirMapError::config("Map output path cannot be empty").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("WAQI API base URL", &self.waqi.api_base_url),
            ("WAQI tiles base URL", &self.waqi.tiles_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AirMapError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// The WAQI token, or a configuration error if none is set
    pub fn require_token(&self) -> std::result::Result<&str, AirMapError> {
        self.waqi
            .token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                AirMapError::config(
                    "No WAQI token configured. Set AIRMAP_WAQI__TOKEN, WAQI_TOKEN or pass --token",
                )
            })
    }
}
