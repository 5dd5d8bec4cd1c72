use std::borrow::Cow;
use std::fmt;

/// Weather condition derived from a WMO weather code.
///
/// Every code maps to exactly one variant; codes outside the recognised
/// groups (and missing codes) land in `Unknown`, which keeps the raw value for
/// its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Showers,
    Thunderstorm,
    Unknown(Option<u8>),
}

impl Condition {
    pub fn from_wmo_code(code: Option<u8>) -> Self {
        match code {
            Some(0) => Self::Clear,
            Some(1 | 2) => Self::PartlyCloudy,
            Some(3) => Self::Overcast,
            Some(45 | 48) => Self::Fog,
            Some(51 | 53 | 55) => Self::Drizzle,
            Some(61 | 63 | 65) => Self::Rain,
            Some(71 | 73 | 75) => Self::Snow,
            Some(80..=82) => Self::Showers,
            Some(95 | 96 | 99) => Self::Thunderstorm,
            other => Self::Unknown(other),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::PartlyCloudy => "🌤️",
            Self::Overcast => "☁️",
            Self::Fog => "🌫️",
            Self::Drizzle => "🌦️",
            Self::Rain | Self::Showers => "🌧️",
            Self::Snow => "❄️",
            Self::Thunderstorm => "⛈️",
            Self::Unknown(_) => "🌡️",
        }
    }

    pub fn label(&self) -> Cow<'static, str> {
        match self {
            Self::Clear => "Clear".into(),
            Self::PartlyCloudy => "Partly cloudy".into(),
            Self::Overcast => "Overcast".into(),
            Self::Fog => "Fog".into(),
            Self::Drizzle => "Drizzle".into(),
            Self::Rain => "Rain".into(),
            Self::Snow => "Snow".into(),
            Self::Showers => "Showers".into(),
            Self::Thunderstorm => "Thunderstorm".into(),
            Self::Unknown(Some(code)) => format!("Code {code}").into(),
            Self::Unknown(None) => "Code -".into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}
