//! epaper-sources: Data source implementations for epaper-server.
//!
//! Each module provides a [`Fetcher`](epaper_core::Fetcher) and a factory
//! registered under the class name used in `ds_*.yml` files.

pub mod static_data;
pub mod weather;
pub mod web_scraper;

pub use static_data::StaticDatasource;
pub use weather::WeatherDatasource;
pub use web_scraper::WebScraperDatasource;

use epaper_core::Registry;
use std::time::Duration;

/// Upper bound for one outbound HTTP request
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Register all built-in data sources with the registry
pub fn register_all(registry: &mut Registry) {
    registry.register_source(weather::CLASS_NAME, weather::create);
    registry.register_source(web_scraper::CLASS_NAME, web_scraper::create);
    registry.register_source(static_data::CLASS_NAME, static_data::create);
}

pub(crate) fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("epaper-server/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let mut registry = Registry::new();
        register_all(&mut registry);
        assert_eq!(
            registry.list_sources(),
            vec![
                "StaticDatasource".to_string(),
                "WeatherDatasource".to_string(),
                "WebScraperDatasource".to_string()
            ]
        );
    }
}
