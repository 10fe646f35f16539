use std::time::Duration;

use serde::Deserialize;

/// Largest accepted request body when none is configured (16 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Compose endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComposeConfig {
    /// Route the endpoint is mounted on
    #[serde(default = "default_path")]
    pub path: String,

    /// Emit derived prompts and generation results on the diagnostic channel
    #[serde(default)]
    pub debug: bool,

    /// How pipeline failures are surfaced to callers
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Upper bound for each upstream call (e.g. "90s", "5m")
    ///
    /// Unset means upstream calls may take as long as the upstream needs.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Largest request body in bytes; larger bodies are treated as malformed
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            debug: false,
            error_policy: ErrorPolicy::default(),
            timeout: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ComposeConfig {
    /// Parse the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout string is not a valid duration
    pub fn timeout_duration(&self) -> anyhow::Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|raw| {
                duration_str::parse(raw).map_err(|e| anyhow::anyhow!("invalid compose.timeout `{raw}`: {e}"))
            })
            .transpose()
    }
}

/// Error surface of the compose endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Plain-text 500 for pipeline failures, 200 with an `error` object when
    /// the final lookup fails
    #[default]
    Compatible,
    /// Distinct status codes and JSON error bodies per failure kind
    Typed,
}

const fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_path() -> String {
    "/api/compose".to_string()
}
