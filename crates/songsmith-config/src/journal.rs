use std::path::PathBuf;

use serde::Deserialize;

/// Append-only request journal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalConfig {
    /// File the journal appends to; parent directories are created on first write
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { path: default_path() }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("logs").join("requests.log")
}
