//! Trade store configuration.

use serde::{Deserialize, Serialize};

/// Where settled trades are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// JSON store file.
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "./data/trades.json".to_string()
}
