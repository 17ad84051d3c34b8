//! Typed option structs for the built-in widget classes.

pub mod calendar;
pub mod date;
pub mod text;
pub mod weather;

pub use calendar::CalendarWidgetConfig;
pub use date::DateWidgetConfig;
pub use text::TextWidgetConfig;
pub use weather::{ChartWidgetConfig, WeatherForecastWidgetConfig};
