//! epaper-types: Shared data types for epaper-server.
//!
//! This crate contains pure configuration types (displays, widgets, data
//! sources, palette colors, fonts) shared by all epaper crates. It performs
//! no I/O and has no graphics dependencies.

pub mod color;
pub mod datasource;
pub mod display;
pub mod font;
pub mod settings;
pub mod source_configs;
pub mod widget;
pub mod widget_configs;

// Re-export commonly used types at the crate root for convenience
pub use color::Color;
pub use datasource::DataSourceConfig;
pub use display::{DisplayConfig, MAX_INTERVAL_S};
pub use font::FontSpec;
pub use settings::{GlobalSettings, Units};
pub use widget::WidgetConfig;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Parse the class-specific keys of an entity into its typed option struct
pub fn parse_options<T: DeserializeOwned>(
    options: &HashMap<String, Value>,
) -> serde_json::Result<T> {
    let object = options
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<serde_json::Map<String, Value>>();
    serde_json::from_value(Value::Object(object))
}
