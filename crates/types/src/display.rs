//! Display ("epaper") configuration.

use crate::color::Color;
use crate::font::FontSpec;
use crate::widget::WidgetConfig;
use serde::{Deserialize, Serialize};

/// Upper bound for any configured interval, in seconds (100 years)
pub const MAX_INTERVAL_S: i64 = 100 * 366 * 24 * 3600;

/// Check that an interval in seconds stays within `±MAX_INTERVAL_S`
pub fn check_interval(name: &str, secs: i64) -> Result<(), String> {
    if secs.unsigned_abs() > MAX_INTERVAL_S as u64 {
        return Err(format!(
            "{} must be within ±{} seconds, got {}",
            name, MAX_INTERVAL_S, secs
        ));
    }
    Ok(())
}

fn default_update_interval_s() -> i64 {
    3600
}

fn default_client_update_delay_s() -> i64 {
    30
}

/// Configuration of one display, as read from an `ep_*.yml` file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Pixel size `[width, height]` before rotation
    pub size: (u32, u32),
    /// Bit depth of the encoded image (1, 2, 4 or 8)
    pub bits_per_pixel: u8,
    /// Fixed palette; index 0 is the background
    pub colors: Vec<Color>,
    /// Counter-clockwise rotation in degrees, applied after drawing
    #[serde(default)]
    pub rotation: f64,
    /// Refresh cadence in seconds; 0 or less renders on every request
    #[serde(default = "default_update_interval_s")]
    pub update_interval_s: i64,
    /// Grace period added before a device is expected to fetch a new version
    #[serde(default = "default_client_update_delay_s")]
    pub client_update_delay_s: i64,
    /// Default font for widgets that do not name one
    #[serde(default)]
    pub font: FontSpec,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
    /// Alternative ids clients may use to reach this display
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Outline every widget region
    #[serde(default)]
    pub debug: bool,
}

impl DisplayConfig {
    /// Check the invariants that cannot be expressed in the serde schema
    pub fn validate(&self) -> Result<(), String> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(format!("size must be non-zero, got {:?}", self.size));
        }
        if !matches!(self.bits_per_pixel, 1 | 2 | 4 | 8) {
            return Err(format!(
                "bits_per_pixel must be 1, 2, 4 or 8, got {}",
                self.bits_per_pixel
            ));
        }
        if self.colors.is_empty() {
            return Err("colors must list at least the background color".to_string());
        }
        let capacity = 1usize << self.bits_per_pixel;
        if self.colors.len() > capacity {
            return Err(format!(
                "{} colors do not fit into {} bits per pixel",
                self.colors.len(),
                self.bits_per_pixel
            ));
        }
        if !self.rotation.is_finite() {
            return Err("rotation must be a finite number of degrees".to_string());
        }
        check_interval("update_interval_s", self.update_interval_s)?;
        check_interval("client_update_delay_s", self.client_update_delay_s)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
size: [640, 384]
bits_per_pixel: 2
colors: [[255, 255, 255], [0, 0, 0], [255, 0, 0]]
rotation: 90
update_interval_s: 600
aliases: [kitchen]
widgets:
  - widget_class: TextWidget
    position: [0, 0]
    size: [640, 40]
    format: "Hello {name}"
    datasource: ds_greeting
  - widget_class: DateWidget
    position: [0, 40]
    size: [640, 40]
    font: ["Roboto-Bold.ttf", 24]
"#;

    #[test]
    fn test_display_config_from_yaml() {
        let config: DisplayConfig = serde_yaml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.size, (640, 384));
        assert_eq!(config.colors[2], Color::new(255, 0, 0));
        assert_eq!(config.client_update_delay_s, 30);
        assert_eq!(config.font, FontSpec::default());
        assert_eq!(config.aliases, vec!["kitchen".to_string()]);
        assert_eq!(config.widgets.len(), 2);

        let text = &config.widgets[0];
        assert_eq!(text.widget_class, "TextWidget");
        assert_eq!(text.datasource.as_deref(), Some("ds_greeting"));
        assert_eq!(
            text.options.get("format").and_then(|v| v.as_str()),
            Some("Hello {name}")
        );
        assert_eq!(config.widgets[1].font.as_ref().map(|f| f.size), Some(24.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_palette() {
        let mut config: DisplayConfig = serde_yaml::from_str(EXAMPLE).unwrap();
        config.bits_per_pixel = 1;
        assert!(config.validate().is_err());

        config.bits_per_pixel = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_intervals() {
        let mut config: DisplayConfig = serde_yaml::from_str(EXAMPLE).unwrap();
        config.update_interval_s = i64::MAX;
        assert!(config.validate().unwrap_err().contains("update_interval_s"));

        config.update_interval_s = MAX_INTERVAL_S;
        config.client_update_delay_s = i64::MIN;
        assert!(config.validate().unwrap_err().contains("client_update_delay_s"));

        config.client_update_delay_s = -30;
        assert!(config.validate().is_ok());
    }
}
