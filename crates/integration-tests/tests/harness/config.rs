//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use songsmith_config::{
    AudioConfig, AuthConfig, ComposeConfig, Config, ErrorPolicy, HealthConfig, JournalConfig, PromptConfig,
    ServerConfig,
};

use super::mock_upstream::MockUpstream;

/// Token the builder configures by default
pub const TEST_TOKEN: &str = "test-token";

/// Builder for constructing test configurations
///
/// The journal lives in a [`JournalDir`] that the test keeps alive.
pub struct ConfigBuilder {
    config: Config,
}

/// Temporary directory holding a test journal
pub struct JournalDir {
    dir: tempfile::TempDir,
}

impl JournalDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("logs").join("requests.log")
    }

    /// Journal lines written so far; empty when the file was never created
    pub fn lines(&self) -> Vec<String> {
        read_lines(&self.path())
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|contents| contents.lines().map(str::to_owned).collect())
        .unwrap_or_default()
}

impl ConfigBuilder {
    /// Config pointing both upstream services at `mock`
    pub fn new(mock: &MockUpstream, journal: &JournalDir) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                auth: AuthConfig {
                    token: Some(SecretString::from(TEST_TOKEN)),
                    ..AuthConfig::default()
                },
                compose: ComposeConfig::default(),
                journal: JournalConfig { path: journal.path() },
                prompt: PromptConfig {
                    base_url: mock.prompt_url().parse().expect("valid URL"),
                    api_key: Some(SecretString::from("test-key")),
                    model: "mock-model".to_owned(),
                    system_prompt: None,
                    temperature: None,
                },
                audio: AudioConfig {
                    base_url: mock.audio_url().parse().expect("valid URL"),
                    api_key: None,
                },
                telemetry: None,
            },
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.compose.error_policy = policy;
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.config.compose.path = path.to_owned();
        self
    }

    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
