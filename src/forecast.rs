use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ForecastError;
use crate::weather::Condition;

/// Fixed-width layout of every hourly time value, e.g. `2026-01-13T14:00`.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const TIME_LEN: usize = 16;

/// Body of the Open-Meteo forecast endpoint. Only the parts the dashboard
/// reads are modelled; every field is optional so that a missing one can be
/// reported by name instead of as a generic decode failure.
#[derive(Deserialize, Debug, Default)]
pub struct ForecastResponse {
    pub timezone: Option<String>,

    pub utc_offset_seconds: Option<i32>,

    pub hourly: Option<HourlyColumns>,
}

/// Parallel arrays, index `i` of each one describing the same hour.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct HourlyColumns {
    pub time: Option<Vec<String>>,

    pub temperature_2m: Option<Vec<Option<f64>>>,

    pub rain: Option<Vec<Option<f64>>>,

    pub weather_code: Option<Vec<Option<u8>>>,

    pub wind_speed_10m: Option<Vec<Option<f64>>>,
}

/// One hourly observation.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    #[serde(serialize_with = "serialize_time")]
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub rain: Option<f64>,
    pub weather_code: Option<u8>,
    pub wind_speed: Option<f64>,
}

impl ForecastPoint {
    pub fn date(&self) -> NaiveDate {
        self.time.date()
    }

    pub fn date_key(&self) -> String {
        self.time.format("%Y-%m-%d").to_string()
    }

    pub fn hour_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    pub fn condition(&self) -> Condition {
        Condition::from_wmo_code(self.weather_code)
    }
}

fn serialize_time<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
}

/// Mapped forecast for one location, as produced by a single fetch.
#[derive(Debug, Clone, Default)]
pub struct Forecast {
    pub timezone: Option<String>,
    pub utc_offset: Option<FixedOffset>,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Current wall-clock time at the forecast location. Falls back to the
    /// local clock when the response carried no UTC offset.
    pub fn now(&self) -> NaiveDateTime {
        match self.utc_offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

impl TryFrom<ForecastResponse> for Forecast {
    type Error = ForecastError;

    fn try_from(response: ForecastResponse) -> Result<Self, Self::Error> {
        let hourly = response
            .hourly
            .ok_or_else(|| ForecastError::MalformedResponse("missing `hourly` object".into()))?;

        let utc_offset = match response.utc_offset_seconds {
            Some(secs) => Some(FixedOffset::east_opt(secs).ok_or_else(|| {
                ForecastError::MalformedResponse(format!("utc offset out of range: {secs}"))
            })?),
            None => None,
        };

        Ok(Self {
            timezone: response.timezone,
            utc_offset,
            points: map_hourly(&hourly)?,
        })
    }
}

/// Parses a time value in the fixed `YYYY-MM-DDTHH:MM` layout.
pub fn parse_time(value: &str) -> Result<NaiveDateTime, ForecastError> {
    let malformed = || ForecastError::MalformedTimestamp(value.to_string());
    if !has_time_layout(value) {
        return Err(malformed());
    }
    NaiveDateTime::parse_from_str(value, TIME_FORMAT).map_err(|_| malformed())
}

/// Checks the byte layout `DDDD-DD-DDTDD:DD`; chrono alone accepts unpadded
/// or space-padded fields.
fn has_time_layout(value: &str) -> bool {
    value.len() == TIME_LEN
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            10 => b == b'T',
            13 => b == b':',
            _ => b.is_ascii_digit(),
        })
}

fn column<'a, T>(name: &str, values: &'a Option<Vec<T>>) -> Result<&'a [T], ForecastError> {
    values
        .as_deref()
        .ok_or_else(|| ForecastError::MalformedResponse(format!("missing `hourly.{name}` array")))
}

fn check_len(name: &str, len: usize, expected: usize) -> Result<(), ForecastError> {
    if len != expected {
        return Err(ForecastError::MalformedResponse(format!(
            "`hourly.{name}` has {len} values, `hourly.time` has {expected}"
        )));
    }
    Ok(())
}

fn non_negative(name: &str, value: Option<f64>) -> Result<Option<f64>, ForecastError> {
    match value {
        Some(v) if v < 0.0 => Err(ForecastError::MalformedResponse(format!(
            "negative `{name}` value: {v}"
        ))),
        other => Ok(other),
    }
}

/// Converts the columnar hourly arrays into one record per hour, keeping the
/// input index order. Fails without producing partial output when a column is
/// missing, the columns disagree in length, or a value is out of domain.
pub fn map_hourly(hourly: &HourlyColumns) -> Result<Vec<ForecastPoint>, ForecastError> {
    let time = column("time", &hourly.time)?;
    let temperature = column("temperature_2m", &hourly.temperature_2m)?;
    let rain = column("rain", &hourly.rain)?;
    let weather_code = column("weather_code", &hourly.weather_code)?;
    let wind_speed = column("wind_speed_10m", &hourly.wind_speed_10m)?;

    let len = time.len();
    check_len("temperature_2m", temperature.len(), len)?;
    check_len("rain", rain.len(), len)?;
    check_len("weather_code", weather_code.len(), len)?;
    check_len("wind_speed_10m", wind_speed.len(), len)?;

    let mut points = Vec::with_capacity(len);
    for i in 0..len {
        points.push(ForecastPoint {
            time: parse_time(&time[i])?,
            temperature: temperature[i],
            rain: non_negative("rain", rain[i])?,
            weather_code: weather_code[i],
            wind_speed: non_negative("wind_speed_10m", wind_speed[i])?,
        });
    }

    Ok(points)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::days::{group_by_day, DEFAULT_DAYS, DEFAULT_HOURS_PER_DAY};

    pub(crate) fn point(time: &str, temperature: f64) -> ForecastPoint {
        ForecastPoint {
            time: parse_time(time).unwrap(),
            temperature: Some(temperature),
            rain: Some(0.0),
            weather_code: Some(0),
            wind_speed: Some(5.0),
        }
    }

    fn columns(times: &[&str]) -> HourlyColumns {
        let n = times.len();
        HourlyColumns {
            time: Some(times.iter().map(|t| t.to_string()).collect()),
            temperature_2m: Some((0..n).map(|i| Some(i as f64)).collect()),
            rain: Some(vec![Some(0.2); n]),
            weather_code: Some(vec![Some(3); n]),
            wind_speed_10m: Some(vec![Some(11.0); n]),
        }
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time("2026-01-13T14:00").unwrap();
        assert_eq!(t.format(TIME_FORMAT).to_string(), "2026-01-13T14:00");

        assert!(matches!(
            parse_time("2026-1-13T14:00"),
            Err(ForecastError::MalformedTimestamp(_))
        ));
        assert!(parse_time("2026-01-13 14:00").is_err());
        assert!(parse_time("2026-01-13T14:00:00").is_err());
        assert!(parse_time("").is_err());
        assert!(parse_time("2026-02-30T00:00").is_err());

        for padded in ["2026-01-13T 4:00", " 2026-1-13T14:00", "+2026-1-13T14:00", "2026-01-1 T14:00"] {
            assert_eq!(
                parse_time(padded),
                Err(ForecastError::MalformedTimestamp(padded.to_string()))
            );
        }
    }

    #[test]
    fn test_map_copies_by_index() {
        let hourly = HourlyColumns {
            time: Some(vec![
                "2026-01-13T00:00".into(),
                "2026-01-13T01:00".into(),
                "2026-01-14T00:00".into(),
            ]),
            temperature_2m: Some(vec![Some(5.0), Some(4.5), Some(3.0)]),
            rain: Some(vec![Some(0.0), None, Some(1.25)]),
            weather_code: Some(vec![Some(0), Some(61), None]),
            wind_speed_10m: Some(vec![Some(3.0), Some(7.5), Some(12.0)]),
        };

        let points = map_hourly(&hourly).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].hour_label(), "01:00");
        assert_eq!(points[1].temperature, Some(4.5));
        assert_eq!(points[1].rain, None);
        assert_eq!(points[1].weather_code, Some(61));
        assert_eq!(points[2].date_key(), "2026-01-14");
        assert_eq!(points[2].rain, Some(1.25));
        assert_eq!(points[2].weather_code, None);
        assert_eq!(points[2].wind_speed, Some(12.0));
    }

    #[test]
    fn test_map_empty() {
        assert!(map_hourly(&columns(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_map_missing_column() {
        let mut hourly = columns(&["2026-01-13T00:00"]);
        hourly.rain = None;
        match map_hourly(&hourly) {
            Err(ForecastError::MalformedResponse(msg)) => assert!(msg.contains("hourly.rain")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_map_length_mismatch() {
        let mut hourly = columns(&["2026-01-13T00:00", "2026-01-13T01:00"]);
        hourly.wind_speed_10m = Some(vec![Some(1.0)]);
        assert!(matches!(
            map_hourly(&hourly),
            Err(ForecastError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_map_negative_rain() {
        let mut hourly = columns(&["2026-01-13T00:00"]);
        hourly.rain = Some(vec![Some(-0.1)]);
        assert!(matches!(
            map_hourly(&hourly),
            Err(ForecastError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_map_bad_timestamp() {
        let hourly = columns(&["2026-01-13T00:00", "13/01/2026 01:00"]);
        assert_eq!(
            map_hourly(&hourly),
            Err(ForecastError::MalformedTimestamp("13/01/2026 01:00".into()))
        );
    }

    #[test]
    fn test_response_without_hourly() {
        let response: ForecastResponse = serde_json::from_str(r#"{"latitude": 44.4}"#).unwrap();
        assert!(matches!(
            Forecast::try_from(response),
            Err(ForecastError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_response_with_nulls() {
        let body = r#"{
            "timezone": "Europe/Rome",
            "utc_offset_seconds": 3600,
            "hourly": {
                "time": ["2026-01-13T00:00", "2026-01-13T01:00"],
                "temperature_2m": [5.0, null],
                "rain": [0.0, 0.4],
                "weather_code": [null, 63],
                "wind_speed_10m": [4.3, 6.1]
            }
        }"#;
        let response: ForecastResponse = serde_json::from_str(body).unwrap();
        let forecast = Forecast::try_from(response).unwrap();
        assert_eq!(forecast.timezone.as_deref(), Some("Europe/Rome"));
        assert_eq!(forecast.utc_offset, FixedOffset::east_opt(3600));
        assert_eq!(forecast.points.len(), 2);
        assert_eq!(forecast.points[1].temperature, None);
        assert_eq!(forecast.points[0].weather_code, None);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(point("2026-01-13T14:00", 7.5)).unwrap();
        assert_eq!(json["time"], "2026-01-13T14:00");
        assert_eq!(json["temperature"], 7.5);
        assert_eq!(json["weatherCode"], 0);
        assert_eq!(json["windSpeed"], 5.0);
    }

    #[test]
    fn test_mapping_is_repeatable() {
        let hourly = columns(&["2026-01-13T00:00", "2026-01-13T01:00", "2026-01-14T00:00"]);
        let first = map_hourly(&hourly).unwrap();
        let second = map_hourly(&hourly).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            group_by_day(&first, DEFAULT_DAYS, DEFAULT_HOURS_PER_DAY),
            group_by_day(&second, DEFAULT_DAYS, DEFAULT_HOURS_PER_DAY)
        );
    }

    #[test]
    fn test_now_uses_location_offset() {
        let offset = FixedOffset::east_opt(-5 * 3600).unwrap();
        let forecast = Forecast {
            utc_offset: Some(offset),
            ..Default::default()
        };
        let expected = Utc::now().with_timezone(&offset).naive_local();
        let drift = (forecast.now() - expected).num_seconds().abs();
        assert!(drift < 3600, "now() is {drift}s away from the location clock");
    }
}
