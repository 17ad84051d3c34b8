//! Month calendar widget configuration.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Options of `CalendarWidget`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarWidgetConfig {
    /// Draw the "Month Year" title row
    #[serde(default = "default_true")]
    pub show_header: bool,
    /// Highlight the current day
    #[serde(default = "default_true")]
    pub highlight_today: bool,
}

impl Default for CalendarWidgetConfig {
    fn default() -> Self {
        Self {
            show_header: true,
            highlight_today: true,
        }
    }
}
