//! Displays, the render pipeline and the refresh scheduler

mod context;
mod display;
mod pipeline;
mod scheduler;

pub use context::AppContext;
pub use display::{generate_version, is_different, Display, UpdateOutcome};
pub use pipeline::{draw_frame, fetch_inputs, WidgetInput};
pub use scheduler::{RefreshScheduler, TickReport};

use epaper_core::Registry;

/// Registry preloaded with every data source and widget shipped with the server
pub trait BuiltinRegistry {
    fn with_builtins() -> Self;
}

impl BuiltinRegistry for Registry {
    fn with_builtins() -> Self {
        let mut registry = Registry::new();
        epaper_sources::register_all(&mut registry);
        epaper_widgets::register_all(&mut registry);
        registry
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use epaper_core::{DataSource, Fetcher, ManualClock, MemoryStore, Registry, SystemClock};
    use epaper_render::RenderResources;
    use epaper_sources::StaticDatasource;
    use epaper_types::{Color, DisplayConfig, FontSpec, GlobalSettings, WidgetConfig};
    use serde_json::{json, Value};

    use super::{BuiltinRegistry, Display};
    use crate::config::{build_widget, Runtime};

    pub fn display_config(size: (u32, u32), rotation: f64) -> DisplayConfig {
        DisplayConfig {
            size,
            bits_per_pixel: 1,
            colors: vec![Color::WHITE, Color::BLACK],
            rotation,
            update_interval_s: 3600,
            client_update_delay_s: 30,
            font: FontSpec::new("Sans", 12.0),
            widgets: Vec::new(),
            aliases: Vec::new(),
            debug: false,
        }
    }

    /// Widget entry covering the whole of a small display
    pub fn widget_config(class: &str, options: Value) -> WidgetConfig {
        let mut entry = json!({
            "widget_class": class,
            "position": [0, 0],
            "size": [40, 20],
        });
        if let (Some(entry), Value::Object(options)) = (entry.as_object_mut(), options) {
            entry.extend(options);
        }
        serde_json::from_value(entry).unwrap()
    }

    pub fn static_source(id: &str, data: Value) -> Arc<DataSource> {
        Arc::new(DataSource::new(
            id,
            None,
            Box::new(StaticDatasource::new(data)),
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
        ))
    }

    struct Unreachable;

    #[async_trait]
    impl Fetcher for Unreachable {
        fn class_name(&self) -> &str {
            "Unreachable"
        }

        async fn fetch(&self) -> Result<Value> {
            Err(anyhow!("connection refused"))
        }
    }

    pub fn failing_source(id: &str) -> Arc<DataSource> {
        Arc::new(DataSource::new(
            id,
            Some(60),
            Box::new(Unreachable),
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
        ))
    }

    /// In-memory services with a clock that only moves when told to
    pub struct TestEnv {
        pub clock: Arc<ManualClock>,
        pub runtime: Runtime,
    }

    impl TestEnv {
        pub fn new() -> Self {
            let clock = Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2024, 3, 14, 11, 0, 0).unwrap(),
            ));
            let runtime = Runtime {
                registry: Registry::with_builtins(),
                store: Arc::new(MemoryStore::new()),
                clock: clock.clone(),
                resources: Arc::new(RenderResources::new("/nonexistent")),
                settings: Arc::new(GlobalSettings::default()),
                minimum_waiting_time: Duration::seconds(30),
            };
            Self { clock, runtime }
        }

        /// Build a display whose widgets are bound to the given sources
        pub fn display(
            &self,
            id: &str,
            config: DisplayConfig,
            widgets: Vec<(WidgetConfig, Option<Arc<DataSource>>)>,
        ) -> Display {
            let widgets = widgets
                .into_iter()
                .enumerate()
                .map(|(index, (widget, source))| {
                    build_widget(&self.runtime, &config, index, &widget, source).unwrap()
                })
                .collect();
            Display::new(
                id,
                config,
                widgets,
                self.runtime.store.clone(),
                self.runtime.clock.clone(),
                self.runtime.resources.clone(),
                self.runtime.settings.clone(),
            )
        }
    }
}
