//! Weather widgets fed by an OpenWeatherMap one-call payload

pub mod charts;
pub mod forecast;
pub mod now;

pub use charts::{WeatherPrecipitationWidget, WeatherTemperatureWidget};
pub use forecast::WeatherForecastWidget;
pub use now::WeatherNowWidget;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use epaper_types::Units;
use serde_json::Value;

/// Icon file stem for an OpenWeatherMap icon code
pub fn icon_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "01d" => "wi-day-sunny",
        "01n" => "wi-moon-new",
        "02d" => "wi-day-cloudy",
        "02n" => "wi-night-cloudy",
        "03d" | "03n" => "wi-cloud",
        "04d" | "04n" => "wi-cloudy",
        "09d" => "wi-day-showers",
        "09n" => "wi-night-showers",
        "10d" => "wi-day-rain",
        "10n" => "wi-night-rain",
        "11d" => "wi-day-thunderstorm",
        "11n" => "wi-night-thunderstorm",
        "13d" | "13n" => "wi-snow",
        "50d" | "50n" => "wi-fog",
        _ => return None,
    })
}

/// Icon path of a weather entry (`current` or one `hourly` item) in `dir`
pub(crate) fn icon_path(entry: &Value, dir: &str) -> Result<String> {
    let code = entry
        .pointer("/weather/0/icon")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("weather entry has no icon code"))?;
    let name = icon_name(code).ok_or_else(|| anyhow!("unknown weather icon code '{}'", code))?;
    Ok(format!("{}/{}.png", dir, name))
}

pub(crate) fn require_data<'a>(data: Option<&'a Value>, widget: &str) -> Result<&'a Value> {
    data.ok_or_else(|| anyhow!("{} drawn without data", widget))
}

pub(crate) fn field<'a>(entry: &'a Value, key: &str) -> Result<&'a Value> {
    entry
        .get(key)
        .ok_or_else(|| anyhow!("weather data has no '{}'", key))
}

pub(crate) fn number(entry: &Value, key: &str) -> Result<f64> {
    field(entry, key)?
        .as_f64()
        .ok_or_else(|| anyhow!("weather field '{}' is not a number", key))
}

pub(crate) fn timestamp(entry: &Value) -> Result<DateTime<Utc>> {
    let dt = field(entry, "dt")?
        .as_i64()
        .ok_or_else(|| anyhow!("weather field 'dt' is not a timestamp"))?;
    DateTime::from_timestamp(dt, 0).ok_or_else(|| anyhow!("timestamp {} out of range", dt))
}

pub(crate) fn format_temperature(value: f64, units: Units) -> String {
    format!("{:.0}{}", value, units.temperature_suffix())
}
