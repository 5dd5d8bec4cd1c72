use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::days::{DEFAULT_DAYS, DEFAULT_HOURS_PER_DAY};
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "meteo.toml";

/// Open-Meteo serves at most this many days ahead.
pub const MAX_FORECAST_DAYS: u8 = 16;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Location {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_latitude() -> f64 {
    44.411
}

fn default_longitude() -> f64 {
    8.896
}

fn default_timezone() -> String {
    "Europe/Rome".to_string()
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Api {
    /// Open-Meteo API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
}

fn default_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_forecast_days() -> u8 {
    7
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            forecast_days: default_forecast_days(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Display {
    /// Hours shown in the charts, starting at the current hour
    #[serde(default = "default_window_hours")]
    pub window_hours: usize,
    #[serde(default = "default_days")]
    pub days: usize,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: usize,
    /// Minutes between automatic refreshes, 0 turns them off
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,
}

const fn default_window_hours() -> usize {
    24
}

const fn default_days() -> usize {
    DEFAULT_DAYS
}

const fn default_hours_per_day() -> usize {
    DEFAULT_HOURS_PER_DAY
}

const fn default_refresh_minutes() -> u64 {
    60
}

impl Default for Display {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            days: default_days(),
            hours_per_day: default_hours_per_day(),
            refresh_minutes: default_refresh_minutes(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct General {
    #[serde(default = "default_log_path")]
    pub log_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_path() -> String {
    "meteo.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub general: General,
}

impl Config {
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Location { latitude, longitude, .. } = self.location;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ConfigError::Invalid(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }
        if self.location.timezone.trim().is_empty() {
            return Err(ConfigError::Invalid("empty timezone".to_string()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Number of forecast days to request, clamped to what the API serves.
    pub fn forecast_days(&self) -> u8 {
        self.api.forecast_days.clamp(1, MAX_FORECAST_DAYS)
    }
}

/// Loads the configuration file.
///
/// A missing file is only an error when it was named explicitly; otherwise the
/// built-in defaults are used.
///
/// # Arguments
///
/// * 'config_path' - path given on the command line, if any
pub fn load_config(config_path: Option<&str>) -> Result<Config, ConfigError> {
    let (path, explicit) = match config_path {
        Some(p) => (p, true),
        None => (DEFAULT_CONFIG_FILE, false),
    };

    if !explicit && !Path::new(path).exists() {
        return Ok(Config::default());
    }

    let toml = fs::read_to_string(path)?;
    Config::from_toml(&toml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.location.latitude, 44.411);
        assert_eq!(config.api.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.display.window_hours, 24);
        assert_eq!(config.display.days, 7);
        assert_eq!(config.display.hours_per_day, 24);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml(
            r#"
            [location]
            latitude = 52.52
            longitude = 13.41

            [display]
            window_hours = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.location.latitude, 52.52);
        assert_eq!(config.location.timezone, "Europe/Rome");
        assert_eq!(config.display.window_hours, 12);
        assert_eq!(config.display.refresh_minutes, 60);
    }

    #[test]
    fn test_invalid_coordinates() {
        let err = Config::from_toml("[location]\nlatitude = 91.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            Config::from_toml("[location\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_forecast_days_clamped() {
        let mut config = Config::default();
        config.api.forecast_days = 40;
        assert_eq!(config.forecast_days(), 16);
        config.api.forecast_days = 0;
        assert_eq!(config.forecast_days(), 1);
    }

    #[test]
    fn test_example_file() {
        let config = Config::from_toml(include_str!("../meteo.toml.example")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_explicit_file() {
        assert!(matches!(
            load_config(Some("/nonexistent/meteo.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
