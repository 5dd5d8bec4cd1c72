use thiserror::Error;

/// Failures surfaced while fetching and reshaping forecast data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    /// The request did not complete or the service answered with a non-success status
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The decoded body does not have the expected hourly shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A time value is not in the `YYYY-MM-DDTHH:MM` layout
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
