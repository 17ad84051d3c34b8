//! Process settings from the command line and environment

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use epaper_types::{GlobalSettings, Units, MAX_INTERVAL_S};

/// `--store` value selecting the process-local store
pub const MEMORY_STORE: &str = "memory";

/// Settings of one server process; every flag has an environment variable
#[derive(Args, Debug, Clone)]
pub struct ServerSettings {
    /// Directory holding the ds_*.yml and ep_*.yml files
    #[arg(long, env = "EPAPER_CONFIG_DIR", default_value = "./config")]
    pub config_dir: PathBuf,

    /// "memory" or the path of a SQLite file shared between processes
    #[arg(long, env = "EPAPER_STORE")]
    pub store: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, env = "EPAPER_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,

    /// Seconds between refresh scheduler passes
    #[arg(long, env = "EPAPER_CYCLIC_INTERVAL_S", default_value_t = 10)]
    pub cyclic_interval: u64,

    /// Lower bound for the max-age handed to clients, in seconds
    #[arg(long, env = "EPAPER_MINIMUM_WAITING_TIME_S", default_value_t = 30)]
    pub minimum_waiting_time: i64,

    /// Directory holding the weather icon sets
    #[arg(long, env = "EPAPER_ICON_DIR", default_value = "./resources/icons")]
    pub icon_dir: PathBuf,

    /// IANA time zone for all local times
    #[arg(long, env = "EPAPER_TIMEZONE", default_value = "Europe/Berlin")]
    pub timezone: String,

    /// metric or imperial
    #[arg(long, env = "EPAPER_UNITS", default_value = "metric")]
    pub units: Units,

    /// strftime format used by date widgets
    #[arg(long, env = "EPAPER_DATE_FORMAT", default_value = "%A, %d.%m.%Y")]
    pub date_format: String,

    /// Language code passed to weather lookups
    #[arg(long, env = "EPAPER_LANG", default_value = "en")]
    pub lang: String,
}

/// Which store back-end to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Sqlite(PathBuf),
}

impl ServerSettings {
    pub fn global_settings(&self) -> GlobalSettings {
        GlobalSettings {
            timezone: self.timezone.clone(),
            units: self.units,
            date_format: self.date_format.clone(),
            lang: self.lang.clone(),
        }
    }

    pub fn cyclic_interval(&self) -> Duration {
        Duration::from_secs(self.cyclic_interval.max(1))
    }

    pub fn minimum_waiting_time(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.minimum_waiting_time.clamp(0, MAX_INTERVAL_S))
    }

    /// Store selected by `--store`, defaulting to a file in the data directory
    pub fn store_location(&self) -> Result<StoreLocation> {
        match self.store.as_deref() {
            Some(MEMORY_STORE) => Ok(StoreLocation::Memory),
            Some(path) => Ok(StoreLocation::Sqlite(PathBuf::from(path))),
            None => Ok(StoreLocation::Sqlite(default_store_path()?)),
        }
    }
}

fn default_store_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("org", "epaper", "epaper-server")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

    Ok(dirs.data_dir().join("store.sqlite3"))
}
