//! OpenWeatherMap one-call source configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

fn default_base_url() -> String {
    DEFAULT_WEATHER_BASE_URL.to_string()
}

/// Options of `WeatherDatasource`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSourceConfig {
    pub api_key: String,
    pub lat: f64,
    pub lon: f64,
    /// Legacy city id, kept for configuration compatibility
    #[serde(default)]
    pub city_id: Option<String>,
    /// Overrides the global language
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}
