//! epaper-core: Core traits and building blocks for epaper-server.
//!
//! This crate contains the staleness policy, the key-value store abstraction
//! and its back-ends, the cached [`DataSource`], the [`Widget`] trait, the
//! factory [`Registry`], and shared constants.

pub mod clock;
pub mod constants;
mod data_source;
mod error;
mod registry;
pub mod staleness;
pub mod store;
mod widget;

pub use clock::{Clock, ManualClock, SystemClock};
pub use data_source::{BoxedFetcher, DataSource, Fetcher};
pub use error::ConfigError;
pub use registry::{Registry, SourceFactory, SourceInit, WidgetFactory, WidgetInit};
pub use staleness::needs_refresh;
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreHandle};
pub use widget::{BoxedWidget, DrawContext, Widget, WidgetBase};

// Re-export types used in trait signatures for convenience
pub use epaper_types::{DataSourceConfig, GlobalSettings, WidgetConfig};
