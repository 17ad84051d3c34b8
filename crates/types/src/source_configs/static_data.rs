//! Static payload source configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options of `StaticDatasource`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StaticSourceConfig {
    /// Payload returned verbatim on every fetch
    #[serde(default)]
    pub data: Value,
}
