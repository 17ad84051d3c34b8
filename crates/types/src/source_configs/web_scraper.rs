//! Web scraper source configuration.

use serde::{Deserialize, Serialize};

/// Options of `WebScraperDatasource`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebScraperSourceConfig {
    pub url: String,
    /// Regular expressions whose named groups become payload fields
    pub find_expressions: Vec<String>,
}
