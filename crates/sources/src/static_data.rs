//! Configuration-provided payload, useful for fixed texts and tests

use anyhow::Result;
use async_trait::async_trait;
use epaper_core::{BoxedFetcher, Fetcher, SourceInit};
use epaper_types::source_configs::StaticSourceConfig;
use serde_json::Value;

pub const CLASS_NAME: &str = "StaticDatasource";

pub struct StaticDatasource {
    data: Value,
}

impl StaticDatasource {
    pub fn new(data: Value) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Fetcher for StaticDatasource {
    fn class_name(&self) -> &str {
        CLASS_NAME
    }

    async fn fetch(&self) -> Result<Value> {
        Ok(self.data.clone())
    }
}

pub fn create(init: &SourceInit<'_>) -> Result<BoxedFetcher> {
    let config: StaticSourceConfig = init.options()?;
    Ok(Box::new(StaticDatasource::new(config.data)))
}
