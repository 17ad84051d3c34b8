//! Weather widget configurations.

use serde::{Deserialize, Serialize};

fn default_column_width() -> u32 {
    80
}

fn default_hour_step() -> usize {
    3
}

/// Options of `WeatherForecastWidget`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherForecastWidgetConfig {
    /// Minimum width of one forecast column
    #[serde(default = "default_column_width")]
    pub column_width: u32,
    /// Hours between two forecast columns
    #[serde(default = "default_hour_step")]
    pub hour_step: usize,
}

impl Default for WeatherForecastWidgetConfig {
    fn default() -> Self {
        Self {
            column_width: default_column_width(),
            hour_step: default_hour_step(),
        }
    }
}

/// Options shared by the precipitation and temperature charts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChartWidgetConfig {
    /// Lower end of the value axis; the chart's default when absent
    #[serde(default)]
    pub min_value: Option<f64>,
    /// Upper end of the value axis; the chart's default when absent
    #[serde(default)]
    pub max_value: Option<f64>,
}
