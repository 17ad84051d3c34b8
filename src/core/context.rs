//! Application context: the loaded entity graph

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Duration;
use epaper_core::{Clock, ConfigError, DataSource};

use super::display::Display;

/// Everything request handlers and the scheduler operate on
pub struct AppContext {
    displays: BTreeMap<String, Arc<Display>>,
    /// Alias -> display id; never points at another alias
    aliases: BTreeMap<String, String>,
    data_sources: HashMap<String, Arc<DataSource>>,
    clock: Arc<dyn Clock>,
    /// Floor of the `max-age` handed to clients
    minimum_waiting_time: Duration,
}

impl AppContext {
    pub fn new(clock: Arc<dyn Clock>, minimum_waiting_time: Duration) -> Self {
        Self {
            displays: BTreeMap::new(),
            aliases: BTreeMap::new(),
            data_sources: HashMap::new(),
            clock,
            minimum_waiting_time,
        }
    }

    pub fn add_data_source(&mut self, source: Arc<DataSource>) {
        self.data_sources.insert(source.id().to_string(), source);
    }

    /// Add a display and its aliases.
    ///
    /// Fails on the first alias that clashes with a known id or alias; the
    /// display is not added in that case.
    pub fn add_display(&mut self, display: Arc<Display>) -> Result<(), ConfigError> {
        let id = display.id().to_string();
        let clash = |alias: &str, existing: &str| ConfigError::DuplicateAlias {
            alias: alias.to_string(),
            display: id.clone(),
            existing: existing.to_string(),
        };
        for alias in display.aliases() {
            if let Some(existing) = self.aliases.get(alias) {
                return Err(clash(alias, existing));
            }
            if self.displays.contains_key(alias) || *alias == id {
                return Err(clash(alias, alias));
            }
        }
        if let Some(owner) = self.aliases.get(&id) {
            return Err(clash(&id, owner));
        }
        for alias in display.aliases() {
            self.aliases.insert(alias.clone(), id.clone());
        }
        self.displays.insert(id, display);
        Ok(())
    }

    pub fn data_source(&self, id: &str) -> Option<&Arc<DataSource>> {
        self.data_sources.get(id)
    }

    pub fn data_sources(&self) -> impl Iterator<Item = &Arc<DataSource>> {
        self.data_sources.values()
    }

    /// Displays sorted by id
    pub fn displays(&self) -> impl Iterator<Item = &Arc<Display>> {
        self.displays.values()
    }

    /// Alias -> display id, sorted by alias
    pub fn aliases(&self) -> impl Iterator<Item = (&String, &String)> {
        self.aliases.iter()
    }

    /// Resolve an id or alias; the flag tells whether `key` was an alias
    pub fn lookup(&self, key: &str) -> Option<(Arc<Display>, bool)> {
        if let Some(display) = self.displays.get(key) {
            return Some((display.clone(), false));
        }
        let target = self.aliases.get(key)?;
        self.displays.get(target).map(|d| (d.clone(), true))
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn minimum_waiting_time(&self) -> Duration {
        self.minimum_waiting_time
    }
}
