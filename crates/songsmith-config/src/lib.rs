#![allow(clippy::must_use_candidate)]

pub mod audio;
pub mod auth;
pub mod compose;
mod env;
pub mod health;
pub mod journal;
mod loader;
pub mod prompt;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use audio::*;
pub use auth::*;
pub use compose::*;
pub use health::*;
pub use journal::*;
pub use prompt::*;
pub use server::*;
pub use telemetry::*;

/// Top-level Songsmith configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Shared-secret authentication for the compose endpoint
    #[serde(default)]
    pub auth: AuthConfig,
    /// Compose pipeline behavior
    #[serde(default)]
    pub compose: ComposeConfig,
    /// Request journal location
    #[serde(default)]
    pub journal: JournalConfig,
    /// Prompt derivation service
    pub prompt: PromptConfig,
    /// Audio generation service
    pub audio: AudioConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
