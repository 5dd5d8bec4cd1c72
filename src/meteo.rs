use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::ForecastError;
use crate::forecast::{Forecast, ForecastResponse};

pub const HOURLY_FIELDS: &str = "temperature_2m,rain,weather_code,wind_speed_10m";

/// Anything able to produce a fresh forecast on demand.
pub trait ForecastSource {
    fn fetch(&self) -> Result<Forecast, ForecastError>;
}

/// Client for the Open-Meteo hourly forecast endpoint, bound to one location.
#[derive(Debug)]
pub struct OpenMeteo {
    client: Client,
    url: Url,
}

impl OpenMeteo {
    pub fn new(config: &Config) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .user_agent(concat!("meteo/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .map_err(|e| ForecastError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            client,
            url: forecast_url(config)?,
        })
    }
}

/// Builds the forecast request URL for the configured location.
pub fn forecast_url(config: &Config) -> Result<Url, ForecastError> {
    let base = config.api.base_url.trim_end_matches('/');
    Url::parse_with_params(
        &format!("{base}/forecast"),
        &[
            ("latitude", config.location.latitude.to_string()),
            ("longitude", config.location.longitude.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("wind_speed_unit", "kmh".to_string()),
            ("timezone", config.location.timezone.clone()),
            ("forecast_days", config.forecast_days().to_string()),
        ],
    )
    .map_err(|e| ForecastError::NetworkFailure(format!("invalid url: {e}")))
}

impl ForecastSource for OpenMeteo {
    #[instrument(skip(self))]
    fn fetch(&self) -> Result<Forecast, ForecastError> {
        debug!(url = %self.url, "Fetching hourly forecast");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|e| ForecastError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::NetworkFailure(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .map_err(|e| ForecastError::NetworkFailure(e.to_string()))?;
        let decoded: ForecastResponse = serde_json::from_str(&body)
            .map_err(|e| ForecastError::MalformedResponse(e.to_string()))?;

        let forecast = Forecast::try_from(decoded)?;
        info!(points = forecast.points.len(), "Forecast fetched");
        Ok(forecast)
    }
}
