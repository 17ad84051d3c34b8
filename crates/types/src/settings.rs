//! Settings shared by every widget and data source.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement system used for fetched weather data and its labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    /// Factor converting the API's wind speed unit (m/s or mph) into knots
    pub fn wind_to_knots(&self) -> f64 {
        match self {
            Units::Metric => 1.94384,
            Units::Imperial => 0.868976,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            other => Err(format!("unknown units '{}', expected metric or imperial", other)),
        }
    }
}

fn default_timezone() -> String {
    "Europe/Berlin".to_string()
}

fn default_date_format() -> String {
    "%A, %d.%m.%Y".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

/// Process-wide presentation settings handed to widgets and fetchers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalSettings {
    /// IANA time zone name used for all local times
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub units: Units,
    /// strftime-style format for dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Language code passed to external APIs
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            units: Units::default(),
            date_format: default_date_format(),
            lang: default_lang(),
        }
    }
}
