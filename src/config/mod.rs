//! Configuration: process settings and the entity files

mod loader;
mod settings;

pub use loader::{
    build_data_source, build_display, build_widget, entity_files, load_context, read_yaml, Runtime,
    DATASOURCE_PREFIX, DISPLAY_PREFIX,
};
pub use settings::{ServerSettings, StoreLocation, MEMORY_STORE};
