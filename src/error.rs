//! Error types and handling for the `airmap` application

use thiserror::Error;

/// Main error type for the `airmap` application
#[derive(Error, Debug)]
pub enum AirMapError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Air quality API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// No usable air quality data was returned for a location
    #[error("No air quality data available for {location}")]
    FetchFailure { location: String },

    /// Map rendering errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AirMapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new fetch failure for a location
    pub fn fetch_failure<S: Into<String>>(location: S) -> Self {
        Self::FetchFailure {
            location: location.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AirMapError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and WAQI token.")
            }
            AirMapError::Api { .. } => {
                "Unable to reach the air quality service. Please check your internet connection."
                    .to_string()
            }
            AirMapError::FetchFailure { .. } => "Failed to retrieve air quality data.".to_string(),
            AirMapError::Render { message } => format!("Map rendering failed: {message}"),
            AirMapError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            AirMapError::FetchFailure { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = AirMapError::config("missing token");
        assert!(matches!(config_err, AirMapError::Config { .. }));

        let api_err = AirMapError::api("connection failed");
        assert!(matches!(api_err, AirMapError::Api { .. }));

        let fetch_err = AirMapError::fetch_failure("Bangkok");
        assert!(matches!(fetch_err, AirMapError::FetchFailure { .. }));
        assert_eq!(
            fetch_err.to_string(),
            "No air quality data available for Bangkok"
        );
    }

    #[test]
    fn test_user_messages() {
        let config_err = AirMapError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = AirMapError::api("test");
        assert!(api_err.user_message().contains("Unable to reach"));

        let fetch_err = AirMapError::fetch_failure("Bangkok");
        assert_eq!(fetch_err.user_message(), "Failed to retrieve air quality data.");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AirMapError::fetch_failure("Bangkok").exit_code(), 2);
        assert_eq!(AirMapError::config("bad").exit_code(), 1);
        assert_eq!(AirMapError::render("bad").exit_code(), 1);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AirMapError = io_err.into();
        assert!(matches!(err, AirMapError::Io { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
