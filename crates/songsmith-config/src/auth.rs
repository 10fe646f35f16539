use secrecy::SecretString;
use serde::Deserialize;

/// Header carrying the shared secret unless overridden
pub const DEFAULT_AUTH_HEADER: &str = "auth-token";

/// Shared-secret authentication configuration
///
/// Requests must present `token` in the `header_name` header. When no token
/// is configured the compose endpoint rejects every request.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Expected token value
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Request header holding the caller's token
    #[serde(default = "default_header_name")]
    pub header_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            header_name: default_header_name(),
        }
    }
}

fn default_header_name() -> String {
    DEFAULT_AUTH_HEADER.to_string()
}
