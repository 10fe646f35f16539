use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_auth_config()?;
        self.validate_compose_config()?;
        self.validate_prompt_config()?;
        Ok(())
    }

    fn validate_auth_config(&self) -> anyhow::Result<()> {
        match self.auth.token {
            Some(ref token) if token.expose_secret().is_empty() => {
                anyhow::bail!("auth.token must not be empty");
            }
            None => {
                tracing::warn!("auth.token is not set, every compose request will be rejected");
            }
            Some(_) => {}
        }

        if http_header_name_is_invalid(&self.auth.header_name) {
            anyhow::bail!("auth.header_name `{}` is not a valid header name", self.auth.header_name);
        }

        Ok(())
    }

    fn validate_compose_config(&self) -> anyhow::Result<()> {
        if !self.compose.path.starts_with('/') {
            anyhow::bail!("compose.path must start with '/'");
        }

        if self.server.health.enabled && self.server.health.path == self.compose.path {
            anyhow::bail!("compose.path and server.health.path must differ");
        }

        self.compose.timeout_duration()?;

        if self.compose.max_body_size == 0 {
            anyhow::bail!("compose.max_body_size must be greater than zero");
        }

        Ok(())
    }

    fn validate_prompt_config(&self) -> anyhow::Result<()> {
        if self.prompt.model.trim().is_empty() {
            anyhow::bail!("prompt.model must not be empty");
        }

        if let Some(temperature) = self.prompt.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            anyhow::bail!("prompt.temperature must be between 0.0 and 2.0");
        }

        Ok(())
    }
}

/// Header names must be non-empty RFC 7230 tokens
fn http_header_name_is_invalid(name: &str) -> bool {
    name.is_empty()
        || !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}
