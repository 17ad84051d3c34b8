//! Builds the entity graph from the configuration directory
//!
//! Every `ds_*.yml` file defines one data source and every `ep_*.yml` file
//! one display; the file stem is the entity id. A broken entity is logged and
//! skipped so the rest still loads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use epaper_core::{
    BoxedWidget, Clock, ConfigError, DataSource, KeyValueStore, Registry, SourceInit, WidgetBase,
    WidgetInit,
};
use epaper_render::RenderResources;
use epaper_types::{DataSourceConfig, DisplayConfig, GlobalSettings, WidgetConfig};
use log::{info, warn};
use serde::de::DeserializeOwned;

use crate::core::{AppContext, Display};

pub const DATASOURCE_PREFIX: &str = "ds_";
pub const DISPLAY_PREFIX: &str = "ep_";

/// Shared services every entity is built with
pub struct Runtime {
    pub registry: Registry,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub resources: Arc<RenderResources>,
    pub settings: Arc<GlobalSettings>,
    pub minimum_waiting_time: Duration,
}

/// `(id, path)` of every entity file with `prefix`, sorted by id
pub fn entity_files(dir: &Path, prefix: &str) -> Result<Vec<(String, PathBuf)>, ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if is_yaml && stem.starts_with(prefix) {
            files.push((stem.to_string(), path.clone()));
        }
    }
    files.sort();
    Ok(files)
}

/// Read and deserialize one YAML file
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_data_source(id: &str, config: &DataSourceConfig, rt: &Runtime) -> Result<DataSource> {
    config.validate().map_err(|reason| ConfigError::InvalidOptions {
        class: config.datasource_class.clone(),
        reason,
    })?;
    let fetcher = rt.registry.create_source(&SourceInit {
        id,
        config,
        settings: &rt.settings,
    })?;
    Ok(DataSource::new(
        id,
        config.max_age_s,
        fetcher,
        rt.store.clone(),
        rt.clock.clone(),
    ))
}

/// Build widget `index` of a display; colors and font fall back to the display's
pub fn build_widget(
    rt: &Runtime,
    display: &DisplayConfig,
    index: usize,
    config: &WidgetConfig,
    datasource: Option<Arc<DataSource>>,
) -> Result<BoxedWidget> {
    let base = WidgetBase {
        id: index,
        class_name: config.widget_class.clone(),
        position: config.position,
        size: config.size,
        colors: config.colors.clone().unwrap_or_else(|| display.colors.clone()),
        font: config.font.clone().unwrap_or_else(|| display.font.clone()),
        datasource,
    };
    rt.registry.create_widget(WidgetInit {
        base,
        config,
        settings: &rt.settings,
    })
}

/// Build a display; widgets that cannot be built are skipped
pub fn build_display(
    id: &str,
    config: DisplayConfig,
    rt: &Runtime,
    sources: &HashMap<String, Arc<DataSource>>,
) -> Result<Display> {
    config.validate().map_err(ConfigError::InvalidDisplay)?;

    let mut widgets = Vec::with_capacity(config.widgets.len());
    for (index, widget_config) in config.widgets.iter().enumerate() {
        let datasource = match &widget_config.datasource {
            None => None,
            Some(ds_id) => match sources.get(ds_id) {
                Some(source) => Some(source.clone()),
                None => {
                    warn!(
                        "Skipping widget {} ({}) of display {}: {}",
                        index,
                        widget_config.widget_class,
                        id,
                        ConfigError::UnknownDataSource(ds_id.clone())
                    );
                    continue;
                }
            },
        };
        match build_widget(rt, &config, index, widget_config, datasource) {
            Ok(widget) => widgets.push(widget),
            Err(e) => warn!(
                "Skipping widget {} ({}) of display {}: {:#}",
                index, widget_config.widget_class, id, e
            ),
        }
    }

    Ok(Display::new(
        id,
        config,
        widgets,
        rt.store.clone(),
        rt.clock.clone(),
        rt.resources.clone(),
        rt.settings.clone(),
    ))
}

/// Load every data source and display below `dir`
pub fn load_context(dir: &Path, rt: &Runtime) -> Result<AppContext> {
    let mut ctx = AppContext::new(rt.clock.clone(), rt.minimum_waiting_time);

    let mut sources = HashMap::new();
    for (id, path) in entity_files(dir, DATASOURCE_PREFIX)? {
        let built = read_yaml::<DataSourceConfig>(&path)
            .map_err(anyhow::Error::from)
            .and_then(|config| build_data_source(&id, &config, rt));
        match built {
            Ok(source) => {
                info!("Loaded data source {} ({})", id, source.class_name());
                let source = Arc::new(source);
                sources.insert(id, source.clone());
                ctx.add_data_source(source);
            }
            Err(e) => warn!("Skipping data source {}: {:#}", id, e),
        }
    }

    for (id, path) in entity_files(dir, DISPLAY_PREFIX)? {
        let built = read_yaml::<DisplayConfig>(&path)
            .map_err(anyhow::Error::from)
            .and_then(|config| build_display(&id, config, rt, &sources));
        let display = match built {
            Ok(display) => display,
            Err(e) => {
                warn!("Skipping display {}: {:#}", id, e);
                continue;
            }
        };
        let widget_count = display.widgets().len();
        match ctx.add_display(Arc::new(display)) {
            Ok(()) => info!("Loaded display {} with {} widgets", id, widget_count),
            Err(e) => warn!("Skipping display {}: {}", id, e),
        }
    }

    Ok(ctx)
}
