//! Typed option structs for the built-in data source classes.

pub mod static_data;
pub mod weather;
pub mod web_scraper;

pub use static_data::StaticSourceConfig;
pub use weather::{WeatherSourceConfig, DEFAULT_WEATHER_BASE_URL};
pub use web_scraper::WebScraperSourceConfig;
