//! Date widget configuration.

use serde::{Deserialize, Serialize};

/// Options of `DateWidget`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DateWidgetConfig {
    /// strftime-style format; the global date format when absent
    #[serde(default)]
    pub date_format: Option<String>,
}
