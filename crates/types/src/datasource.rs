//! Data source configuration.

use crate::display::check_interval;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Configuration of one data source, as read from a `ds_*.yml` file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSourceConfig {
    pub datasource_class: String,
    /// Seconds a fetched payload stays fresh; absent or 0 refetches on every access
    #[serde(default)]
    pub max_age_s: Option<i64>,
    #[serde(flatten)]
    pub options: HashMap<String, Value>,
}

impl DataSourceConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.max_age_s {
            Some(secs) => check_interval("max_age_s", secs),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_configs::WebScraperSourceConfig;

    #[test]
    fn test_datasource_config_keeps_class_options() {
        let yaml = r#"
datasource_class: WebScraperDatasource
max_age_s: 900
url: https://example.org/level
find_expressions:
  - 'Level: (?P<level>[0-9.]+)'
"#;
        let config: DataSourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_age_s, Some(900));

        let typed: WebScraperSourceConfig = crate::parse_options(&config.options).unwrap();
        assert_eq!(typed.url, "https://example.org/level");
        assert_eq!(typed.find_expressions.len(), 1);
    }

    #[test]
    fn test_validate_rejects_huge_max_age() {
        let mut config: DataSourceConfig =
            serde_yaml::from_str("datasource_class: StaticDatasource").unwrap();
        assert!(config.validate().is_ok());
        config.max_age_s = Some(i64::MAX);
        assert!(config.validate().unwrap_err().contains("max_age_s"));
    }
}
