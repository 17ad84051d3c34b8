//! Text widget configuration.

use serde::{Deserialize, Serialize};

/// Options of `TextWidget`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextWidgetConfig {
    /// Text with `{key}` placeholders resolved against the data source payload
    pub format: String,
}
