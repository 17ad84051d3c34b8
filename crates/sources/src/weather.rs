//! OpenWeatherMap one-call data source

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use epaper_core::{BoxedFetcher, Fetcher, SourceInit};
use epaper_types::source_configs::WeatherSourceConfig;
use epaper_types::Units;
use log::info;
use serde_json::Value;

pub const CLASS_NAME: &str = "WeatherDatasource";

/// Fetches current, minutely and hourly weather in one request
pub struct WeatherDatasource {
    id: String,
    config: WeatherSourceConfig,
    units: Units,
    lang: String,
    client: reqwest::Client,
}

impl WeatherDatasource {
    pub fn new(id: &str, config: WeatherSourceConfig, units: Units, lang: &str) -> Result<Self> {
        let lang = config.lang.clone().unwrap_or_else(|| lang.to_string());
        Ok(Self {
            id: id.to_string(),
            config,
            units,
            lang,
            client: crate::http_client()?,
        })
    }

    /// One-call URL; includes the API key
    pub fn url(&self) -> String {
        format!(
            "{}/onecall?units={}&lang={}&lat={}&lon={}&appid={}",
            self.config.base_url.trim_end_matches('/'),
            self.units,
            self.lang,
            self.config.lat,
            self.config.lon,
            self.config.api_key
        )
    }
}

#[async_trait]
impl Fetcher for WeatherDatasource {
    fn class_name(&self) -> &str {
        CLASS_NAME
    }

    async fn fetch(&self) -> Result<Value> {
        info!(
            "Updating {} in {}, lat={} lon={}",
            self.id, CLASS_NAME, self.config.lat, self.config.lon
        );
        let response = self
            .client
            .get(self.url())
            .send()
            .await
            .context("requesting one-call weather")?
            .error_for_status()
            .context("one-call weather request rejected")?;
        let onecall: Value = response.json().await.context("decoding one-call weather")?;
        Ok(onecall)
    }
}

pub fn create(init: &SourceInit<'_>) -> Result<BoxedFetcher> {
    let config: WeatherSourceConfig = init.options()?;
    Ok(Box::new(WeatherDatasource::new(
        init.id,
        config,
        init.settings.units,
        &init.settings.lang,
    )?))
}
