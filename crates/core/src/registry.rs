//! Registry for data source and widget classes
//!
//! Configuration names a class by string. Each class registers a factory
//! under that discriminator; lookups happen only while loading configuration.

use std::collections::HashMap;

use anyhow::Result;
use epaper_types::{parse_options, DataSourceConfig, GlobalSettings, WidgetConfig};
use serde::de::DeserializeOwned;

use crate::data_source::BoxedFetcher;
use crate::error::ConfigError;
use crate::widget::{BoxedWidget, WidgetBase};

/// Inputs for building a fetcher
pub struct SourceInit<'a> {
    pub id: &'a str,
    pub config: &'a DataSourceConfig,
    pub settings: &'a GlobalSettings,
}

impl SourceInit<'_> {
    /// Parse the class-specific options
    pub fn options<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        parse_options(&self.config.options).map_err(|e| ConfigError::InvalidOptions {
            class: self.config.datasource_class.clone(),
            reason: e.to_string(),
        })
    }
}

/// Inputs for building a widget; colors and font are already resolved
pub struct WidgetInit<'a> {
    pub base: WidgetBase,
    pub config: &'a WidgetConfig,
    pub settings: &'a GlobalSettings,
}

impl WidgetInit<'_> {
    pub fn options<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        parse_options(&self.config.options).map_err(|e| ConfigError::InvalidOptions {
            class: self.config.widget_class.clone(),
            reason: e.to_string(),
        })
    }

    /// Fail unless the widget is bound to a data source
    pub fn require_datasource(&self) -> Result<(), ConfigError> {
        if self.base.datasource.is_none() {
            return Err(ConfigError::MissingDataSource {
                class: self.config.widget_class.clone(),
            });
        }
        Ok(())
    }
}

/// Function that creates a fetcher
pub type SourceFactory = fn(&SourceInit<'_>) -> Result<BoxedFetcher>;

/// Function that creates a widget
pub type WidgetFactory = fn(WidgetInit<'_>) -> Result<BoxedWidget>;

/// Maps class discriminators to factories
pub struct Registry {
    sources: HashMap<String, SourceFactory>,
    widgets: HashMap<String, WidgetFactory>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            widgets: HashMap::new(),
        }
    }

    pub fn register_source(&mut self, class: &str, factory: SourceFactory) {
        self.sources.insert(class.to_string(), factory);
    }

    pub fn register_widget(&mut self, class: &str, factory: WidgetFactory) {
        self.widgets.insert(class.to_string(), factory);
    }

    /// Create a fetcher for `init.config.datasource_class`
    pub fn create_source(&self, init: &SourceInit<'_>) -> Result<BoxedFetcher> {
        let class = &init.config.datasource_class;
        let factory = self
            .sources
            .get(class)
            .ok_or_else(|| ConfigError::UnknownClass {
                kind: "data source",
                class: class.clone(),
            })?;
        factory(init)
    }

    /// Create a widget for `init.config.widget_class`
    pub fn create_widget(&self, init: WidgetInit<'_>) -> Result<BoxedWidget> {
        let factory = self
            .widgets
            .get(&init.config.widget_class)
            .ok_or_else(|| ConfigError::UnknownClass {
                kind: "widget",
                class: init.config.widget_class.clone(),
            })?;
        factory(init)
    }

    /// List all registered data source classes, sorted
    pub fn list_sources(&self) -> Vec<String> {
        let mut classes: Vec<_> = self.sources.keys().cloned().collect();
        classes.sort();
        classes
    }

    /// List all registered widget classes, sorted
    pub fn list_widgets(&self) -> Vec<String> {
        let mut classes: Vec<_> = self.widgets.keys().cloned().collect();
        classes.sort();
        classes
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::Fetcher;
    use crate::widget::{DrawContext, Widget};
    use async_trait::async_trait;
    use epaper_types::{Color, FontSpec};
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize)]
    struct EchoOptions {
        value: Value,
    }

    struct Echo(Value);

    #[async_trait]
    impl Fetcher for Echo {
        fn class_name(&self) -> &str {
            "Echo"
        }

        async fn fetch(&self) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    fn create_echo(init: &SourceInit<'_>) -> Result<BoxedFetcher> {
        let options: EchoOptions = init.options()?;
        Ok(Box::new(Echo(options.value)))
    }

    struct Blank(WidgetBase);

    impl Widget for Blank {
        fn base(&self) -> &WidgetBase {
            &self.0
        }

        fn draw(&self, _ctx: &DrawContext<'_>, _data: Option<&Value>) -> Result<()> {
            Ok(())
        }
    }

    fn create_bound_blank(init: WidgetInit<'_>) -> Result<BoxedWidget> {
        init.require_datasource()?;
        Ok(Box::new(Blank(init.base)))
    }

    fn source_config(class: &str, options: Value) -> DataSourceConfig {
        serde_json::from_value(json!({ "datasource_class": class }))
            .map(|mut c: DataSourceConfig| {
                if let Value::Object(map) = options {
                    c.options = map.into_iter().collect();
                }
                c
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_source_parses_options() {
        let mut registry = Registry::new();
        registry.register_source("Echo", create_echo);

        let settings = GlobalSettings::default();
        let config = source_config("Echo", json!({ "value": [1, 2] }));
        let fetcher = registry
            .create_source(&SourceInit {
                id: "echo",
                config: &config,
                settings: &settings,
            })
            .unwrap();
        assert_eq!(fetcher.fetch().await.unwrap(), json!([1, 2]));

        let bad = source_config("Echo", json!({}));
        let err = registry
            .create_source(&SourceInit {
                id: "echo",
                config: &bad,
                settings: &settings,
            })
            .err()
            .unwrap();
        assert!(err.to_string().contains("invalid options for Echo"));
    }

    #[test]
    fn test_unknown_class_is_config_error() {
        let registry = Registry::new();
        let settings = GlobalSettings::default();
        let config = source_config("Nope", json!({}));
        let err = registry
            .create_source(&SourceInit {
                id: "x",
                config: &config,
                settings: &settings,
            })
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownClass { .. })
        ));
    }

    #[test]
    fn test_widget_requiring_source() {
        let mut registry = Registry::new();
        registry.register_widget("Blank", create_bound_blank);
        assert_eq!(registry.list_widgets(), vec!["Blank".to_string()]);

        let settings = GlobalSettings::default();
        let config: WidgetConfig = serde_json::from_value(json!({
            "widget_class": "Blank",
            "position": [0, 0],
            "size": [10, 10],
        }))
        .unwrap();
        let base = WidgetBase {
            id: 0,
            class_name: "Blank".into(),
            position: (0, 0),
            size: (10, 10),
            colors: vec![Color::WHITE, Color::BLACK],
            font: FontSpec::default(),
            datasource: None,
        };
        let err = registry
            .create_widget(WidgetInit {
                base,
                config: &config,
                settings: &settings,
            })
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingDataSource { .. })
        ));
    }
}
