use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Suno-API-compatible audio generation service
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioConfig {
    /// Service base URL; `/api/custom_generate` and `/api/get` are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    #[serde(default)]
    pub api_key: Option<SecretString>,
}
