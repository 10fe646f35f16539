use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// OpenAI-compatible chat completions service used to derive structured prompts
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// API base URL, e.g. `https://api.openai.com/v1`
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer token for the service
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Chat model name
    pub model: String,
    /// System message override
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[allow(clippy::missing_panics_doc)]
fn default_base_url() -> Url {
    Url::parse("https://api.openai.com/v1").expect("valid default URL")
}
