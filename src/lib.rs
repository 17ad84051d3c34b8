//! epaper-server: renders widget-based displays for e-paper clients.
//!
//! This library provides:
//! - Displays with image-diff gated versioning and their render pipeline
//! - The background refresh scheduler
//! - Configuration loading from `ds_*.yml` / `ep_*.yml` files
//! - The HTTP surface with conditional GET

pub mod config;
pub mod core;
pub mod server;

// Re-export commonly used types
pub use config::{load_context, Runtime, ServerSettings};
pub use core::{AppContext, BuiltinRegistry, Display, RefreshScheduler};
