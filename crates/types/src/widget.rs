//! Widget entries inside a display configuration.

use crate::color::Color;
use crate::font::FontSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One widget entry of a display.
///
/// `widget_class` selects the implementation; keys that are not part of the
/// common fields are kept in `options` and parsed by that implementation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetConfig {
    pub widget_class: String,
    /// Top-left corner in display pixels
    pub position: (i32, i32),
    pub size: (u32, u32),
    /// Overrides the display palette for this widget
    #[serde(default)]
    pub colors: Option<Vec<Color>>,
    #[serde(default)]
    pub font: Option<FontSpec>,
    /// Id of the data source feeding this widget
    #[serde(default)]
    pub datasource: Option<String>,
    #[serde(flatten)]
    pub options: HashMap<String, Value>,
}
