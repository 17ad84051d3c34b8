use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use epaper_core::{KeyValueStore, MemoryStore, Registry, SqliteStore, SystemClock};
use epaper_render::RenderResources;
use epaper_server::config::{load_context, Runtime, ServerSettings, StoreLocation};
use epaper_server::core::{BuiltinRegistry, RefreshScheduler};
use epaper_server::server;
use log::{info, warn};

/// epaper-server - renders dashboards for e-paper displays and serves them over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "epaper-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: ServerSettings,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG overrides the -d level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting epaper-server v{}", env!("CARGO_PKG_VERSION"));
    let settings = cli.settings;

    let store: Arc<dyn KeyValueStore> = match settings.store_location()? {
        StoreLocation::Memory => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreLocation::Sqlite(path) => {
            info!("Using SQLite store at {}", path.display());
            Arc::new(SqliteStore::open(&path)?)
        }
    };

    let runtime = Runtime {
        registry: Registry::with_builtins(),
        store,
        clock: Arc::new(SystemClock),
        resources: Arc::new(RenderResources::new(settings.icon_dir.clone())),
        settings: Arc::new(settings.global_settings()),
        minimum_waiting_time: settings.minimum_waiting_time(),
    };
    let ctx = Arc::new(load_context(&settings.config_dir, &runtime)?);
    if ctx.displays().next().is_none() {
        warn!("No displays configured in {}", settings.config_dir.display());
    }

    let scheduler = RefreshScheduler::new(ctx.displays().cloned().collect(), settings.cyclic_interval());
    tokio::spawn(async move { scheduler.run().await });

    server::serve(ctx, &settings.bind).await
}
