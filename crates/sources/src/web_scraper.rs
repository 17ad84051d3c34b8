//! Web page scraper: regular expressions with named groups extract fields

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use epaper_core::{BoxedFetcher, ConfigError, Fetcher, SourceInit};
use epaper_types::source_configs::WebScraperSourceConfig;
use log::{debug, info};
use regex::Regex;
use serde_json::{Map, Value};

pub const CLASS_NAME: &str = "WebScraperDatasource";

pub struct WebScraperDatasource {
    id: String,
    url: String,
    expressions: Vec<Regex>,
    client: reqwest::Client,
}

impl WebScraperDatasource {
    pub fn new(id: &str, config: WebScraperSourceConfig) -> Result<Self> {
        let expressions = config
            .find_expressions
            .iter()
            .map(|expr| {
                Regex::new(expr).map_err(|e| ConfigError::InvalidOptions {
                    class: CLASS_NAME.to_string(),
                    reason: format!("bad find expression '{}': {}", expr, e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: id.to_string(),
            url: config.url,
            expressions,
            client: crate::http_client()?,
        })
    }

    /// Collect the named groups of every matching expression.
    ///
    /// Later expressions overwrite fields of earlier ones; groups that did
    /// not participate in the match yield an empty string.
    pub fn extract(&self, body: &str) -> Map<String, Value> {
        let mut data = Map::new();
        for re in &self.expressions {
            let Some(caps) = re.captures(body) else {
                info!("{}: no match for '{}'", self.id, re.as_str());
                continue;
            };
            for name in re.capture_names().flatten() {
                let value = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
                data.insert(name.to_string(), Value::String(value.to_string()));
            }
        }
        data
    }
}

#[async_trait]
impl Fetcher for WebScraperDatasource {
    fn class_name(&self) -> &str {
        CLASS_NAME
    }

    async fn fetch(&self) -> Result<Value> {
        info!("Updating {} in {}, fetching {}", self.id, CLASS_NAME, self.url);
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("requesting {}", self.url))?
            .error_for_status()
            .with_context(|| format!("request to {} rejected", self.url))?
            .text()
            .await
            .with_context(|| format!("reading body of {}", self.url))?;
        let data = self.extract(&body);
        debug!("{}: collected {:?}", self.id, data);
        Ok(Value::Object(data))
    }
}

pub fn create(init: &SourceInit<'_>) -> Result<BoxedFetcher> {
    let config: WebScraperSourceConfig = init.options()?;
    Ok(Box::new(WebScraperDatasource::new(init.id, config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scraper(expressions: &[&str]) -> Result<WebScraperDatasource> {
        WebScraperDatasource::new(
            "ds_river",
            WebScraperSourceConfig {
                url: "http://localhost/level".into(),
                find_expressions: expressions.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    #[test]
    fn test_extract_merges_named_groups() {
        let ds = scraper(&[
            r"Level: (?P<level>[0-9.]+) cm",
            r"Trend: (?P<trend>\w+)(?: since (?P<since>\d+))?",
            r"Alarm: (?P<alarm>\w+)",
        ])
        .unwrap();
        let body = "<p>Level: 123.4 cm</p><p>Trend: rising</p>";
        assert_eq!(
            Value::Object(ds.extract(body)),
            json!({ "level": "123.4", "trend": "rising", "since": "" })
        );
    }

    #[test]
    fn test_optional_group_fills_in_when_present() {
        let ds = scraper(&[r"Trend: (?P<trend>\w+)(?: since (?P<since>\d+))?"]).unwrap();
        assert_eq!(
            Value::Object(ds.extract("Trend: falling since 1430")),
            json!({ "trend": "falling", "since": "1430" })
        );
        // A later match without the group blanks the earlier value
        let ds = scraper(&[
            r"Old: (?P<since>\d+)",
            r"Trend: (?P<trend>\w+)(?: since (?P<since>\d+))?",
        ])
        .unwrap();
        assert_eq!(
            Value::Object(ds.extract("Old: 900 Trend: steady")),
            json!({ "trend": "steady", "since": "" })
        );
    }

    #[test]
    fn test_invalid_expression_is_config_error() {
        let err = scraper(&["(?P<open"]).err().unwrap();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
