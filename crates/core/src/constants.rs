//! Shared constants

use std::time::Duration;

/// Store namespace holding display state
pub const DISPLAY_NAMESPACE: &str = "display";

/// Store namespace holding data source state
pub const DATASOURCE_NAMESPACE: &str = "datasource";

/// Period of the refresh scheduler
pub const DEFAULT_CYCLIC_INTERVAL: Duration = Duration::from_secs(10);

/// Lower bound for the `Cache-Control: max-age` handed to devices, in seconds.
/// Keeps devices from polling in a tight loop once an update is overdue.
pub const MINIMUM_WAITING_TIME_S: i64 = 30;

/// Length of a display version token
pub const VERSION_LENGTH: usize = 32;

/// Symbols a version token is drawn from
pub const VERSION_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

// Subkeys of persisted entity state
pub const SUBKEY_IMAGE: &str = "image";
pub const SUBKEY_VERSION: &str = "version";
pub const SUBKEY_LAST_UPDATE: &str = "last_update";
pub const SUBKEY_NEXT_CLIENT_UPDATE: &str = "next_client_update";
pub const SUBKEY_DATA: &str = "data";
